//! Shared application state (§10.5): one `Clone` struct of `Arc`-wrapped
//! components, built once in `main` and handed to every route via axum's
//! `State` extractor.

use std::sync::Arc;
use std::time::Instant;

use codesearch_config::AppConfig;
use codesearch_lexical::LexicalIndex;
use codesearch_registry::SourceRegistry;
use codesearch_search::HybridSearchEngine;
use codesearch_skills::SkillRegistry;
use codesearch_store::MetadataStore;
use codesearch_vector::VectorStore;
use codesearch_workflows::{TemplateStore, WorkflowEngine};

use crate::indexing::IndexingService;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MetadataStore>,
    pub registry: Arc<SourceRegistry>,
    pub lexical: Arc<LexicalIndex>,
    pub vector: Arc<VectorStore>,
    pub search_engine: Arc<HybridSearchEngine>,
    pub skill_registry: Arc<SkillRegistry>,
    pub workflow_engine: Arc<WorkflowEngine>,
    pub template_store: Arc<TemplateStore>,
    pub indexing_service: Arc<IndexingService>,
    pub config: Arc<AppConfig>,
    pub start_time: Instant,
}

impl AppState {
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
