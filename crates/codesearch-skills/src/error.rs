//! Skill contract error type (§4.8).

use codesearch_core::error::{Classify, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkillExecutionError {
    #[error("missing required input field '{0}'")]
    MissingField(String),

    #[error("input field '{field}' expected type {expected}")]
    TypeMismatch { field: String, expected: String },

    #[error("input field '{0}' must not be empty")]
    EmptyField(String),

    #[error("skill '{0}' is not registered")]
    NotFound(String),

    #[error("skill '{skill}' not implemented yet: {reason}")]
    NotImplemented { skill: String, reason: String },

    #[error("required capability '{0}' was not provided by the host")]
    CapabilityUnavailable(String),

    #[error("{0}")]
    Failed(String),
}

impl Classify for SkillExecutionError {
    fn kind(&self) -> ErrorKind {
        match self {
            SkillExecutionError::MissingField(_)
            | SkillExecutionError::TypeMismatch { .. }
            | SkillExecutionError::EmptyField(_) => ErrorKind::InvalidInput,
            SkillExecutionError::NotFound(_) => ErrorKind::NotFound,
            SkillExecutionError::NotImplemented { .. } => ErrorKind::DependencyUnavailable,
            SkillExecutionError::CapabilityUnavailable(_) => ErrorKind::DependencyUnavailable,
            SkillExecutionError::Failed(_) => ErrorKind::Internal,
        }
    }
}
