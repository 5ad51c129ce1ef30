//! # codesearch-core
//!
//! Shared domain entities, the cross-index identity scheme, and the error
//! taxonomy used by every other `codesearch-*` crate.
//!
//! ## Modules
//!
//! - `identity` - deterministic `doc_id` derivation from canonicalized paths
//! - `entities` - `Source`, `FileRecord`, `Chunk`, `IndexStats`
//! - `workflow` - `WorkflowTemplate`, `WorkflowExecution`, step records
//! - `skill` - `SkillDescriptor`, schema types, the step-output value variant
//! - `error` - the seven-kind error taxonomy (`ErrorKind`) and `CoreError`

pub mod entities;
pub mod error;
pub mod identity;
pub mod skill;
pub mod workflow;

pub use entities::*;
pub use error::{CoreError, ErrorKind};
pub use identity::doc_id_for_path;
pub use skill::{FieldType, SchemaField, ScalarValue, SkillDescriptor, StepValue};
pub use workflow::*;
