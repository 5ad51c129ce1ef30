//! HTTP surface (§6): an `ApiServer` wrapping a `Router<AppState>` built
//! from route-family modules, layered with `tower-http`'s tracing
//! middleware.

pub mod agent;
pub mod search;
pub mod sources;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::error::ServerError;
use state::AppState;

fn sources_routes() -> Router<AppState> {
    Router::new()
        .route("/sources", get(sources::list).post(sources::create))
        .route(
            "/sources/:id",
            get(sources::get).patch(sources::update).delete(sources::remove),
        )
        .route("/sources/:id/reindex", post(sources::reindex))
        .route("/sources/:id/discover", get(sources::discover))
        // Backward-compatible alias (§6): same handlers under /directories.
        .route("/directories", get(sources::list).post(sources::create))
        .route(
            "/directories/:id",
            get(sources::get).patch(sources::update).delete(sources::remove),
        )
        .route("/directories/:id/reindex", post(sources::reindex))
        .route("/directories/:id/discover", get(sources::discover))
}

fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/search/keyword", post(search::keyword))
        .route("/search/semantic", post(search::semantic))
        .route("/search/hybrid", post(search::hybrid))
        .route("/search/:mode", post(search::dispatch))
}

fn agent_routes() -> Router<AppState> {
    Router::new()
        .route("/agent/execute", post(agent::execute))
        .route("/agent/execute-workflow", post(agent::execute_workflow))
        .route("/agent/templates", get(agent::list_templates).post(agent::register_template))
        .route("/agent/templates/:id", get(agent::get_template))
        .route("/agent/skills", get(agent::list_skills))
        .route("/agent/skills/:name", get(agent::get_skill))
        .route("/agent/info", get(agent::info))
        .route("/agent/health", get(agent::health))
}

pub fn build_router(state: AppState) -> Router {
    search_routes()
        .merge(sources_routes())
        .merge(agent_routes())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Thin wrapper over the built `Router`.
pub struct ApiServer {
    app: Router,
}

impl ApiServer {
    pub fn new(state: AppState) -> Self {
        Self {
            app: build_router(state),
        }
    }

    pub async fn run(self, addr: SocketAddr) -> Result<(), ServerError> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        axum::serve(listener, self.app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        Ok(())
    }
}
