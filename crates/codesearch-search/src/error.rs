//! Error taxonomy for the hybrid search engine.

use codesearch_core::error::{Classify, ErrorKind};
use codesearch_lexical::LexicalError;
use codesearch_store::StoreError;
use codesearch_vector::VectorError;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("keyword retrieval failed: {0}")]
    Lexical(#[from] LexicalError),

    #[error("semantic retrieval failed: {0}")]
    Vector(#[from] VectorError),

    #[error("metadata store error: {0}")]
    Store(#[from] StoreError),

    /// Both retrieval arms failed in hybrid mode; there is nothing left to
    /// degrade to.
    #[error("both keyword and semantic retrieval failed: {0}")]
    BothRetrievalsFailed(String),
}

impl Classify for SearchError {
    fn kind(&self) -> ErrorKind {
        match self {
            SearchError::Lexical(e) => e.kind(),
            SearchError::Vector(e) => e.kind(),
            SearchError::Store(e) => e.kind(),
            SearchError::BothRetrievalsFailed(_) => ErrorKind::DependencyFailed,
        }
    }
}
