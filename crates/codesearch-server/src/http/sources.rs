//! Source management routes (§6): CRUD over registered sources plus the
//! reindex trigger and the subdirectory discovery helper for UI pickers.
//! The `/directories` alias is wired in [`crate::http::router`] onto the
//! same handlers, not duplicated here.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use codesearch_core::entities::{NewSourceOptions, Source, SourceChanges, SourceFilter, SourceType};
use codesearch_registry::discover_subdirectories;
use serde::{Deserialize, Serialize};

use crate::error::ServerResult;
use crate::http::state::AppState;
use crate::indexing::ReindexSummary;

#[derive(Debug, Deserialize)]
pub struct ListSourcesQuery {
    #[serde(default)]
    pub enabled_only: bool,
    #[serde(default)]
    pub kind: Option<String>,
}

fn parse_kind(kind: &Option<String>) -> Option<SourceType> {
    match kind.as_deref() {
        Some("repository") => Some(SourceType::Repository),
        Some("directory") => Some(SourceType::Directory),
        _ => None,
    }
}

pub async fn list(State(state): State<AppState>, Query(query): Query<ListSourcesQuery>) -> ServerResult<Json<Vec<Source>>> {
    let filter = SourceFilter {
        enabled_only: query.enabled_only,
        kind: parse_kind(&query.kind),
    };
    Ok(Json(state.registry.list(filter).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateSourceRequest {
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub auto_reindex: bool,
}

pub async fn create(State(state): State<AppState>, Json(request): Json<CreateSourceRequest>) -> ServerResult<Json<Source>> {
    let options = NewSourceOptions {
        priority: request.priority,
        notes: request.notes,
        auto_reindex: request.auto_reindex,
    };
    let source = state.registry.register(&request.path, &request.name, options).await?;
    Ok(Json(source))
}

pub async fn get(State(state): State<AppState>, Path(source_id): Path<i64>) -> ServerResult<Json<Source>> {
    Ok(Json(state.registry.get(source_id).await?))
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateSourceRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub auto_reindex: Option<bool>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub notes: Option<Option<String>>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(source_id): Path<i64>,
    Json(request): Json<UpdateSourceRequest>,
) -> ServerResult<Json<Source>> {
    let changes = SourceChanges {
        name: request.name,
        enabled: request.enabled,
        auto_reindex: request.auto_reindex,
        priority: request.priority,
        notes: request.notes,
    };
    Ok(Json(state.registry.update(source_id, changes).await?))
}

pub async fn remove(State(state): State<AppState>, Path(source_id): Path<i64>) -> ServerResult<StatusCode> {
    state.registry.remove(source_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Default)]
pub struct ReindexRequest {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub force_full: bool,
}

#[derive(Debug, Serialize)]
pub struct ReindexResponse {
    pub source_id: i64,
    pub files_scanned: usize,
    pub files_reindexed: usize,
    pub files_removed: usize,
    pub scan_failed: bool,
}

impl From<ReindexSummary> for ReindexResponse {
    fn from(summary: ReindexSummary) -> Self {
        Self {
            source_id: summary.source_id,
            files_scanned: summary.files_scanned,
            files_reindexed: summary.files_reindexed,
            files_removed: summary.files_removed,
            scan_failed: summary.scan_failed,
        }
    }
}

pub async fn reindex(
    State(state): State<AppState>,
    Path(source_id): Path<i64>,
    Json(request): Json<ReindexRequest>,
) -> ServerResult<Json<ReindexResponse>> {
    let source = state.registry.get(source_id).await?;
    let summary = state
        .indexing_service
        .reindex_source(&source, request.include, request.exclude, request.force_full)
        .await?;
    Ok(Json(summary.into()))
}

#[derive(Debug, Deserialize)]
pub struct DiscoverQuery {
    #[serde(default = "default_depth")]
    pub max_depth: u32,
}

fn default_depth() -> u32 {
    2
}

#[derive(Debug, Serialize)]
pub struct DiscoveredEntryBody {
    pub path: String,
    pub name: String,
    pub is_repository: bool,
}

pub async fn discover(
    State(state): State<AppState>,
    Path(source_id): Path<i64>,
    Query(query): Query<DiscoverQuery>,
) -> ServerResult<Json<Vec<DiscoveredEntryBody>>> {
    let source = state.registry.get(source_id).await?;
    let entries = discover_subdirectories(&source.path, query.max_depth)
        .into_iter()
        .map(|e| DiscoveredEntryBody {
            path: e.path.to_string_lossy().to_string(),
            name: e.name,
            is_repository: e.is_repository,
        })
        .collect();
    Ok(Json(entries))
}
