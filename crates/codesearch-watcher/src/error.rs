//! Watcher error types.

use codesearch_core::error::{Classify, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("path not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("watcher error: {0}")]
    Notify(String),
}

impl Classify for WatcherError {
    fn kind(&self) -> ErrorKind {
        match self {
            WatcherError::NotFound(_) | WatcherError::InvalidPath(_) => ErrorKind::InvalidInput,
            WatcherError::Notify(_) => ErrorKind::Transient,
        }
    }
}
