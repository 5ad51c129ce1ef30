//! Lexical indexer error types.

use codesearch_core::error::{Classify, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexicalError {
    #[error("tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),

    #[error("query parse error: {0}")]
    QueryParse(String),

    #[error("batch write failed after exhausting retries: {0}")]
    BatchWriteExhausted(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Classify for LexicalError {
    fn kind(&self) -> ErrorKind {
        match self {
            LexicalError::Tantivy(_) | LexicalError::Io(_) => ErrorKind::Transient,
            LexicalError::QueryParse(_) => ErrorKind::InvalidInput,
            LexicalError::BatchWriteExhausted(_) => ErrorKind::DependencyFailed,
        }
    }
}
