//! Vector indexer error types.

use codesearch_core::error::{Classify, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("embedding model error: {0}")]
    Embedding(String),

    #[error("qdrant error: {0}")]
    Qdrant(#[from] qdrant_client::QdrantError),

    #[error("collection not ready: {0}")]
    CollectionUnavailable(String),
}

impl Classify for VectorError {
    fn kind(&self) -> ErrorKind {
        match self {
            VectorError::Embedding(_) => ErrorKind::Internal,
            VectorError::Qdrant(_) => ErrorKind::DependencyUnavailable,
            VectorError::CollectionUnavailable(_) => ErrorKind::DependencyUnavailable,
        }
    }
}
