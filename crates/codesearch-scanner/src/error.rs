//! Scanner error types.

use codesearch_core::error::{Classify, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScannerError {
    #[error("invalid glob pattern: {0}")]
    InvalidPattern(String),

    #[error("source root is not accessible: {0}")]
    RootUnreadable(String),
}

impl Classify for ScannerError {
    fn kind(&self) -> ErrorKind {
        match self {
            ScannerError::InvalidPattern(_) => ErrorKind::InvalidInput,
            ScannerError::RootUnreadable(_) => ErrorKind::Transient,
        }
    }
}
