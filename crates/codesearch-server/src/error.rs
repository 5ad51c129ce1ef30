//! The server's single error type (§7): every downstream crate's error
//! folds in here, and one `IntoResponse`/exit-code mapping is derived from
//! `ErrorKind` rather than matching each wrapped variant individually.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use codesearch_core::error::{Classify, ErrorKind};
use codesearch_registry::RegistryError;
use codesearch_search::SearchError;
use codesearch_skills::SkillExecutionError;
use codesearch_store::StoreError;
use codesearch_workflows::WorkflowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Skill(#[from] SkillExecutionError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("scan failed: {0}")]
    Scan(String),

    #[error("lexical index error: {0}")]
    Lexical(String),

    #[error("vector index error: {0}")]
    Vector(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Classify for ServerError {
    fn kind(&self) -> ErrorKind {
        match self {
            ServerError::Store(e) => e.kind(),
            ServerError::Registry(e) => e.kind(),
            ServerError::Search(e) => e.kind(),
            ServerError::Skill(e) => e.kind(),
            ServerError::Workflow(e) => e.kind(),
            ServerError::Scan(_) | ServerError::Lexical(_) | ServerError::Vector(_) => ErrorKind::DependencyFailed,
            ServerError::Config(_) | ServerError::InvalidInput(_) => ErrorKind::InvalidInput,
            ServerError::NotFound(_) => ErrorKind::NotFound,
            ServerError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl ServerError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::DependencyUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::DependencyFailed => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Transient => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// CLI exit code per §6: `1` user error, `2` not found, `3` conflict,
    /// `4` service unreachable, `5` internal.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::InvalidInput => 1,
            ErrorKind::NotFound => 2,
            ErrorKind::Conflict => 3,
            ErrorKind::DependencyUnavailable | ErrorKind::DependencyFailed => 4,
            ErrorKind::Transient | ErrorKind::Internal => 5,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({
            "error": {
                "kind": format!("{:?}", self.kind()),
                "message": self.to_string(),
            }
        }));
        (status, body).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404_and_exit_code_2() {
        let err = ServerError::NotFound("unknown template 'x'".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn invalid_input_maps_to_400_and_exit_code_1() {
        let err = ServerError::InvalidInput("query must not be empty".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn dependency_failures_map_to_503_and_exit_code_4() {
        for err in [
            ServerError::Scan("walk failed".to_string()),
            ServerError::Lexical("index open failed".to_string()),
            ServerError::Vector("qdrant unreachable".to_string()),
        ] {
            assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(err.exit_code(), 4);
        }
    }

    #[test]
    fn internal_maps_to_500_and_exit_code_5() {
        let err = ServerError::Internal("unexpected".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.exit_code(), 5);
    }
}
