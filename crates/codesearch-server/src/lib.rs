//! Binary-crate wiring (§10.5): config loading, component construction, and
//! the `AppContext` both the HTTP surface and the CLI surface are built
//! from. `lib.rs` holds the logic; `main.rs` stays a thin entry point.

pub mod cli;
pub mod error;
pub mod http;
pub mod indexing;

use std::path::PathBuf;
use std::sync::Arc;

use codesearch_config::AppConfig;
use codesearch_lexical::LexicalIndex;
use codesearch_registry::SourceRegistry;
use codesearch_search::{HybridSearchEngine, RrfConfig};
use codesearch_skills::{
    CodeAnalysisSkill, LlmSkill, RelationalQuerySkill, ReportSkill, SearchSkill, SkillRegistry,
};
use codesearch_store::{ConnectionMode, MemoryStore, MetadataStore, SurrealConnection, SurrealStore};
use codesearch_vector::{Embedder, VectorStore};
use codesearch_workflows::{TemplateStore, WorkflowEngine};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{ServerError, ServerResult};
use crate::http::state::AppState;
use crate::indexing::IndexingService;

/// Every long-lived component the binary wires together, shared by the
/// HTTP surface (wrapped into an [`AppState`]) and the CLI surface (used
/// directly).
#[derive(Clone)]
pub struct AppContext {
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
}

impl AppContext {
    pub fn into_state(self) -> AppState {
        AppState {
            store: self.store,
            registry: self.registry,
            lexical: self.lexical,
            vector: self.vector,
            search_engine: self.search_engine,
            skill_registry: self.skill_registry,
            workflow_engine: self.workflow_engine,
            template_store: self.template_store,
            indexing_service: self.indexing_service,
            config: self.config,
            start_time: std::time::Instant::now(),
        }
    }
}

/// `"in-memory"` selects [`MemoryStore`] (no persistence, used for one-shot
/// CLI demos and tests); any other value opens the embedded SurrealDB
/// single-file engine under the data directory.
const IN_MEMORY_SENTINEL: &str = "in-memory";

fn embedding_dim(model_id: &str) -> u64 {
    match model_id {
        "sentence-transformers/all-MiniLM-L6-v2" => 384,
        _ => 384,
    }
}

/// Builds every component from a resolved [`AppConfig`]: opens the metadata
/// store, the lexical index, and the vector store; loads the embedding
/// model; registers the built-in skills; loads workflow templates from the
/// data directory; and assembles the hybrid search engine and the
/// indexing service on top.
pub async fn init_context(config: AppConfig) -> ServerResult<AppContext> {
    let config = Arc::new(config);
    let data_dir = PathBuf::from(&config.data_dir);

    let store: Arc<dyn MetadataStore> = if config.data_dir == IN_MEMORY_SENTINEL {
        info!("using in-memory metadata store");
        Arc::new(MemoryStore::new())
    } else {
        std::fs::create_dir_all(&data_dir).map_err(|e| ServerError::Config(e.to_string()))?;
        let path = data_dir.join("metadata.skv");
        let conn = SurrealConnection::new(ConnectionMode::File(path))
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        Arc::new(
            SurrealStore::new(conn)
                .await
                .map_err(ServerError::Store)?,
        )
    };

    let registry = Arc::new(SourceRegistry::new(store.clone()));

    let lexical = Arc::new(
        LexicalIndex::open_or_create(&data_dir.join("lexical")).map_err(|e| ServerError::Lexical(e.to_string()))?,
    );

    let vector = Arc::new(
        VectorStore::new(&config.qdrant.url, &config.qdrant.collection)
            .map_err(|e| ServerError::Vector(e.to_string()))?,
    );
    if let Err(e) = vector.ensure_collection(embedding_dim(&config.embedding.model_id)).await {
        warn!(error = %e, "could not ensure qdrant collection exists at startup; will retry on first write");
    }

    let embedder = Arc::new(Mutex::new(
        Embedder::new(&config.embedding.model_id, config.embedding.max_input_tokens)
            .map_err(|e| ServerError::Vector(e.to_string()))?,
    ));

    let rrf = RrfConfig {
        k: config.search.rrf_k,
        keyword_weight: config.search.keyword_weight,
        vector_weight: config.search.vector_weight,
    };
    let search_engine = Arc::new(HybridSearchEngine::new(
        lexical.clone(),
        vector.clone(),
        embedder.clone(),
        store.clone(),
        rrf,
        config.search.overfetch_multiplier as usize,
    ));

    let skill_registry = Arc::new(SkillRegistry::new());
    skill_registry.register(Arc::new(SearchSkill::new(search_engine.clone())));
    skill_registry.register(Arc::new(ReportSkill::new()));
    skill_registry.register(Arc::new(CodeAnalysisSkill::new()));
    skill_registry.register(Arc::new(RelationalQuerySkill::new()));
    skill_registry.register(Arc::new(LlmSkill::new(None)));

    let workflow_engine = Arc::new(WorkflowEngine::new(skill_registry.clone()));

    let template_store = Arc::new(TemplateStore::new());
    let templates_dir = data_dir.join("templates");
    for failure in template_store
        .load_dir(&templates_dir, &skill_registry)
        .map_err(ServerError::Workflow)?
    {
        warn!(error = %failure, "skipped a workflow template file at startup");
    }

    let indexing_service = Arc::new(IndexingService::new(
        store.clone(),
        lexical.clone(),
        vector.clone(),
        embedder,
        config.embedding.max_chunk_chars,
        config.embedding.chunk_overlap_chars,
    ));

    Ok(AppContext {
        store,
        registry,
        lexical,
        vector,
        search_engine,
        skill_registry,
        workflow_engine,
        template_store,
        indexing_service,
        config,
    })
}
