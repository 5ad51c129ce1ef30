//! The seven-kind error taxonomy shared across crate boundaries.
//!
//! Every crate-local error enum (`StoreError`, `ScannerError`, ...) implements
//! [`Classify`] so the HTTP edge and CLI exit-code mapping can treat them
//! uniformly without knowing which crate produced the error.

use thiserror::Error;

/// The error kinds from the error-handling design. Maps directly onto HTTP
/// status codes and CLI exit codes at the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User-provided argument violates schema or constraint (400/422).
    InvalidInput,
    /// Referenced entity is absent (404).
    NotFound,
    /// Duplicate path or concurrent mutation (409).
    Conflict,
    /// A required provider is unreachable (503).
    DependencyUnavailable,
    /// A provider returned an error within the request.
    DependencyFailed,
    /// I/O or network error eligible for bounded retry.
    Transient,
    /// Unexpected invariant violation (500).
    Internal,
}

/// Implemented by every crate-local error enum to classify itself into the
/// shared taxonomy without requiring a concrete `From` conversion.
pub trait Classify {
    fn kind(&self) -> ErrorKind;
}

/// A small general-purpose error used directly by `codesearch-core` itself
/// (entity validation, identity derivation) and as a catch-all at crate
/// seams that don't yet need their own enum.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {entity_type} {id}")]
    NotFound { entity_type: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Classify for CoreError {
    fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidInput(_) => ErrorKind::InvalidInput,
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::Conflict(_) => ErrorKind::Conflict,
            CoreError::Internal(_) => ErrorKind::Internal,
        }
    }
}
