//! Metadata store error types.

use codesearch_core::error::{Classify, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("source already exists at path: {0}")]
    AlreadyExists(String),

    #[error("source not found: {0}")]
    SourceNotFound(i64),

    #[error("file record not found: {0}")]
    FileNotFound(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Classify for StoreError {
    fn kind(&self) -> ErrorKind {
        match self {
            StoreError::AlreadyExists(_) => ErrorKind::Conflict,
            StoreError::SourceNotFound(_) | StoreError::FileNotFound(_) => ErrorKind::NotFound,
            StoreError::Database(_) => ErrorKind::Transient,
            StoreError::Serialization(_) | StoreError::Io(_) => ErrorKind::Internal,
        }
    }
}

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}
