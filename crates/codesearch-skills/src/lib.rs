//! Skill framework (spec §4.8): a uniform contract — `descriptor()` plus
//! asynchronous `execute(input) -> output` — and a registry that validates a
//! proposed workflow's skill references and interpolation targets.

pub mod builtin;
pub mod error;
pub mod registry;
pub mod skill;
pub mod validation;

pub use builtin::{CodeAnalysisSkill, LlmClient, LlmSkill, RelationalQuerySkill, ReportSkill, SearchSkill};
pub use error::SkillExecutionError;
pub use registry::SkillRegistry;
pub use skill::Skill;
pub use validation::validate_input;
