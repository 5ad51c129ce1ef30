//! Search routes (§6): one handler per retrieval mode, sharing a body shape
//! and a response shape with the hybrid engine doing the mode dispatch.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use codesearch_search::{SearchFilters, SearchMode, SearchQuery};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};
use crate::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchFiltersBody {
    #[serde(default)]
    pub repositories: Vec<String>,
    #[serde(default)]
    pub directories: Vec<i64>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub extension: Vec<String>,
}

impl From<SearchFiltersBody> for SearchFilters {
    fn from(body: SearchFiltersBody) -> Self {
        SearchFilters {
            repositories: body.repositories,
            directory_source_ids: body.directories,
            folder_prefix: body.folder,
            extensions: body.extension,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub min_score: Option<f64>,
    #[serde(default)]
    pub filters: SearchFiltersBody,
}

#[derive(Debug, Serialize)]
pub struct SearchResultBody {
    pub doc_id: String,
    pub path: String,
    pub source: String,
    pub score: f64,
    pub snippet: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponseBody {
    pub results: Vec<SearchResultBody>,
    pub total_results: usize,
    pub search_time_ms: u64,
    pub mode: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}

async fn run_search(state: &AppState, mode: SearchMode, request: SearchRequest) -> ServerResult<SearchResponseBody> {
    let started = Instant::now();
    if request.query.trim().is_empty() {
        return Err(ServerError::InvalidInput("query must not be empty".to_string()));
    }

    let query = SearchQuery {
        text: request.query,
        mode,
        limit: request.limit.unwrap_or(state.config.search.default_limit as usize),
        min_score: request.min_score.unwrap_or(0.0),
        filters: request.filters.into(),
    };

    let response = state.search_engine.search(&query).await?;
    let results: Vec<SearchResultBody> = response
        .hits
        .into_iter()
        .map(|hit| SearchResultBody {
            doc_id: hit.doc_id,
            path: hit.path,
            source: hit.source_name,
            score: hit.score,
            snippet: hit.snippet,
        })
        .collect();

    Ok(SearchResponseBody {
        total_results: results.len(),
        results,
        search_time_ms: started.elapsed().as_millis() as u64,
        mode: mode_name(mode),
        degraded: response.degraded,
    })
}

fn mode_name(mode: SearchMode) -> &'static str {
    match mode {
        SearchMode::Keyword => "keyword",
        SearchMode::Semantic => "semantic",
        SearchMode::Hybrid => "hybrid",
    }
}

pub async fn keyword(State(state): State<AppState>, Json(request): Json<SearchRequest>) -> ServerResult<Json<SearchResponseBody>> {
    Ok(Json(run_search(&state, SearchMode::Keyword, request).await?))
}

pub async fn semantic(State(state): State<AppState>, Json(request): Json<SearchRequest>) -> ServerResult<Json<SearchResponseBody>> {
    Ok(Json(run_search(&state, SearchMode::Semantic, request).await?))
}

pub async fn hybrid(State(state): State<AppState>, Json(request): Json<SearchRequest>) -> ServerResult<Json<SearchResponseBody>> {
    Ok(Json(run_search(&state, SearchMode::Hybrid, request).await?))
}

/// Dispatches on the `{mode}` path segment so `/search/{mode}` is one route
/// entry instead of three, while still rejecting an unrecognized mode.
pub async fn dispatch(
    State(state): State<AppState>,
    Path(mode): Path<String>,
    Json(request): Json<SearchRequest>,
) -> ServerResult<Json<SearchResponseBody>> {
    let mode = match mode.as_str() {
        "keyword" => SearchMode::Keyword,
        "semantic" => SearchMode::Semantic,
        "hybrid" => SearchMode::Hybrid,
        other => return Err(ServerError::InvalidInput(format!("unknown search mode '{other}'"))),
    };
    Ok(Json(run_search(&state, mode, request).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_body_maps_fields_onto_search_filters_one_to_one() {
        let body = SearchFiltersBody {
            repositories: vec!["repo-a".to_string()],
            directories: vec![7],
            folder: Some("src/".to_string()),
            extension: vec!["rs".to_string()],
        };
        let filters: SearchFilters = body.into();
        assert_eq!(filters.repositories, vec!["repo-a".to_string()]);
        assert_eq!(filters.directory_source_ids, vec![7]);
        assert_eq!(filters.folder_prefix, Some("src/".to_string()));
        assert_eq!(filters.extensions, vec!["rs".to_string()]);
    }

    #[test]
    fn mode_name_is_lowercase_and_stable() {
        assert_eq!(mode_name(SearchMode::Keyword), "keyword");
        assert_eq!(mode_name(SearchMode::Semantic), "semantic");
        assert_eq!(mode_name(SearchMode::Hybrid), "hybrid");
    }
}
