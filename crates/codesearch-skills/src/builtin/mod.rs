//! Built-in skills the core ships (§4.8).

pub mod code_analysis;
pub mod llm;
pub mod relational_query;
pub mod report;
pub mod search;

pub use code_analysis::CodeAnalysisSkill;
pub use llm::{LlmClient, LlmSkill};
pub use relational_query::RelationalQuerySkill;
pub use report::ReportSkill;
pub use search::SearchSkill;
