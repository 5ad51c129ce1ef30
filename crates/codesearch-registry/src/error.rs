//! Registry error types.

use codesearch_core::error::{Classify, ErrorKind};
use codesearch_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("path is not a directory: {0}")]
    NotADirectory(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Classify for RegistryError {
    fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::PathNotFound(_) | RegistryError::NotADirectory(_) => {
                ErrorKind::InvalidInput
            }
            RegistryError::Store(e) => e.kind(),
        }
    }
}
