//! Workflow engine error type (§4.9).

use codesearch_core::error::{Classify, ErrorKind};
use codesearch_skills::SkillExecutionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("required parameter '{0}' was not supplied and has no default")]
    MissingParameter(String),

    #[error("step '{step_id}' references '{reference}', which did not resolve against any parameter or prior step output")]
    UnresolvedReference { step_id: String, reference: String },

    #[error("step '{step_id}' has a malformed interpolation placeholder: {text}")]
    MalformedPlaceholder { step_id: String, text: String },

    #[error("step '{step_id}' references skill '{skill}', which is not registered")]
    SkillNotFound { step_id: String, skill: String },

    #[error("failed to parse workflow template: {0}")]
    TemplateParse(String),

    #[error("template '{0}' was not found")]
    TemplateNotFound(String),

    #[error("template '{0}' is already registered")]
    TemplateConflict(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Skill(#[from] SkillExecutionError),
}

impl Classify for WorkflowError {
    fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::MissingParameter(_)
            | WorkflowError::UnresolvedReference { .. }
            | WorkflowError::MalformedPlaceholder { .. } => ErrorKind::InvalidInput,
            WorkflowError::SkillNotFound { .. } | WorkflowError::TemplateNotFound(_) => ErrorKind::NotFound,
            WorkflowError::TemplateConflict(_) => ErrorKind::Conflict,
            WorkflowError::TemplateParse(_) => ErrorKind::InvalidInput,
            WorkflowError::Io(_) => ErrorKind::Internal,
            WorkflowError::Skill(e) => e.kind(),
        }
    }
}
