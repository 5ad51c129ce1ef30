//! The hybrid search engine (§4.7): dispatches keyword, semantic, or fused
//! retrieval, then hydrates fused `doc_id`s against the metadata store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use codesearch_core::entities::{Source, SourceFilter, SourceType};
use codesearch_lexical::{search as lexical_search, LexicalFilter, LexicalHit, LexicalIndex};
use codesearch_store::MetadataStore;
use codesearch_vector::{Embedder, VectorError, VectorFilter, VectorHit, VectorStore};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::SearchError;
use crate::filters::SearchFilters;
use crate::fusion::{fuse, RrfConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Keyword,
    Semantic,
    Hybrid,
}

#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub mode: SearchMode,
    pub limit: usize,
    pub min_score: f64,
    pub filters: SearchFilters,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub doc_id: String,
    pub score: f64,
    pub path: String,
    pub source_name: String,
    pub snippet: Option<String>,
    pub mtime: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub degraded: bool,
}

/// Embeds a single query string into the vector used for semantic
/// retrieval. A trait so the engine can be exercised in keyword-only tests
/// without loading an embedding model.
#[async_trait]
pub trait QueryEmbedder: Send + Sync {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, VectorError>;
}

#[async_trait]
impl QueryEmbedder for Mutex<Embedder> {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, VectorError> {
        let mut embedder = self.lock().await;
        let mut vectors = embedder.embed_batch(&[text.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| VectorError::Embedding("embedding batch returned no vector".to_string()))
    }
}

pub struct HybridSearchEngine {
    lexical: Arc<LexicalIndex>,
    vector: Arc<VectorStore>,
    embedder: Arc<dyn QueryEmbedder>,
    store: Arc<dyn MetadataStore>,
    rrf: RrfConfig,
    overfetch_multiplier: usize,
}

impl HybridSearchEngine {
    pub fn new(
        lexical: Arc<LexicalIndex>,
        vector: Arc<VectorStore>,
        embedder: Arc<dyn QueryEmbedder>,
        store: Arc<dyn MetadataStore>,
        rrf: RrfConfig,
        overfetch_multiplier: usize,
    ) -> Self {
        Self {
            lexical,
            vector,
            embedder,
            store,
            rrf,
            overfetch_multiplier,
        }
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchError> {
        match query.mode {
            SearchMode::Keyword => {
                let hits = self
                    .keyword_retrieve(&query.text, &query.filters, query.limit)
                    .await?;
                let scores: HashMap<String, f64> = hits
                    .iter()
                    .map(|h| (h.doc_id.clone(), h.score as f64))
                    .collect();
                let ids: Vec<String> = hits.into_iter().map(|h| h.doc_id).collect();
                let hits = self
                    .hydrate(&ids, &query.filters, &scores, &HashMap::new())
                    .await?;
                Ok(SearchResponse {
                    hits,
                    degraded: false,
                })
            }
            SearchMode::Semantic => {
                let hits = self
                    .semantic_retrieve(&query.text, &query.filters, query.limit)
                    .await?;
                let (scores, snippets) = vector_hit_maps(&hits);
                let ids: Vec<String> = hits.into_iter().map(|h| h.doc_id).collect();
                let hits = self
                    .hydrate(&ids, &query.filters, &scores, &snippets)
                    .await?;
                Ok(SearchResponse {
                    hits,
                    degraded: false,
                })
            }
            SearchMode::Hybrid => self.search_hybrid(query).await,
        }
    }

    async fn search_hybrid(&self, query: &SearchQuery) -> Result<SearchResponse, SearchError> {
        let overfetch = query.limit.saturating_mul(self.overfetch_multiplier).max(query.limit);
        let (keyword_res, vector_res) = tokio::join!(
            self.keyword_retrieve(&query.text, &query.filters, overfetch),
            self.semantic_retrieve(&query.text, &query.filters, overfetch),
        );

        let (keyword_ids, vector_ids, snippets, degraded) = match (keyword_res, vector_res) {
            (Ok(k), Ok(v)) => {
                let (_, snippets) = vector_hit_maps(&v);
                let keyword_ids: Vec<String> = k.into_iter().map(|h| h.doc_id).collect();
                let vector_ids: Vec<String> = v.into_iter().map(|h| h.doc_id).collect();
                (keyword_ids, vector_ids, snippets, false)
            }
            (Ok(k), Err(e)) => {
                warn!(error = %e, "semantic retrieval failed, degrading to keyword-only");
                let keyword_ids: Vec<String> = k.into_iter().map(|h| h.doc_id).collect();
                (keyword_ids, Vec::new(), HashMap::new(), true)
            }
            (Err(e), Ok(v)) => {
                warn!(error = %e, "keyword retrieval failed, degrading to semantic-only");
                let (_, snippets) = vector_hit_maps(&v);
                let vector_ids: Vec<String> = v.into_iter().map(|h| h.doc_id).collect();
                (Vec::new(), vector_ids, snippets, true)
            }
            (Err(ek), Err(ev)) => {
                return Err(SearchError::BothRetrievalsFailed(format!(
                    "keyword: {ek}; semantic: {ev}"
                )))
            }
        };

        let fused = fuse(&keyword_ids, &vector_ids, &self.rrf, query.limit, query.min_score);
        let scores: HashMap<String, f64> =
            fused.iter().map(|f| (f.doc_id.clone(), f.score)).collect();
        let ids: Vec<String> = fused.into_iter().map(|f| f.doc_id).collect();
        let hits = self.hydrate(&ids, &query.filters, &scores, &snippets).await?;
        Ok(SearchResponse { hits, degraded })
    }

    async fn keyword_retrieve(
        &self,
        text: &str,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<LexicalHit>, SearchError> {
        let index = Arc::clone(&self.lexical);
        let query = text.to_string();
        let filter = lexical_filter_for(filters);
        let result = tokio::task::spawn_blocking(move || lexical_search(&index, &query, &filter, limit))
            .await
            .map_err(|e| SearchError::BothRetrievalsFailed(format!("keyword search task panicked: {e}")))?;
        Ok(result?)
    }

    async fn semantic_retrieve(
        &self,
        text: &str,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<VectorHit>, SearchError> {
        let vector = self.embedder.embed_query(text).await?;
        let filter = self.vector_filter_for(filters).await;
        Ok(self.vector.search(vector, &filter, limit as u64).await?)
    }

    /// Resolves a repository name to its `source_id` so a single-repository
    /// filter can be pushed into the vector store, which keys on id rather
    /// than name. Returns `None` (no pushdown, `hydrate` still filters) if
    /// the lookup fails or no source matches.
    async fn resolve_repository_id(&self, name: &str) -> Option<i64> {
        let sources = self.store.list_sources(SourceFilter::default()).await.ok()?;
        sources
            .into_iter()
            .find(|s| s.source_type == SourceType::Repository && s.name == name)
            .map(|s| s.source_id)
    }

    /// Builds the native vector-store predicate for the source dimension of
    /// `filters`. Only pushed down when exactly one source (repository or
    /// directory) is selected — `VectorFilter` has no OR support, so a
    /// multi-valued filter is left to `hydrate`'s post-filter instead.
    async fn vector_filter_for(&self, filters: &SearchFilters) -> VectorFilter {
        let mut filter = VectorFilter::default();
        if filters.repositories.len() == 1 && filters.directory_source_ids.is_empty() {
            if let Some(source_id) = self.resolve_repository_id(&filters.repositories[0]).await {
                filter.source_type = Some(SourceType::Repository.as_str().to_string());
                filter.source_id = Some(source_id);
            }
        } else if filters.directory_source_ids.len() == 1 && filters.repositories.is_empty() {
            filter.source_type = Some(SourceType::Directory.as_str().to_string());
            filter.source_id = Some(filters.directory_source_ids[0]);
        }
        filter
    }

    /// Fetches display fields for each `doc_id` and applies `filters`. A
    /// `doc_id` that no longer resolves to a file record or source is
    /// dropped, not backfilled (§4.7).
    async fn hydrate(
        &self,
        ids: &[String],
        filters: &SearchFilters,
        scores: &HashMap<String, f64>,
        snippets: &HashMap<String, Option<String>>,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let mut hits = Vec::with_capacity(ids.len());
        let mut source_cache: HashMap<i64, Source> = HashMap::new();

        for doc_id in ids {
            let file = match self.store.get_file(doc_id).await {
                Ok(f) => f,
                Err(e) => {
                    warn!(doc_id, error = %e, "dropping result: file record missing");
                    continue;
                }
            };

            let source = if let Some(s) = source_cache.get(&file.source_id) {
                s.clone()
            } else {
                match self.store.get_source(file.source_id).await {
                    Ok(s) => {
                        source_cache.insert(file.source_id, s.clone());
                        s
                    }
                    Err(e) => {
                        warn!(doc_id, error = %e, "dropping result: source missing");
                        continue;
                    }
                }
            };

            if !filters.admits(&source, &file) {
                continue;
            }

            hits.push(SearchHit {
                doc_id: doc_id.clone(),
                score: scores.get(doc_id).copied().unwrap_or(0.0),
                path: file.relative_path,
                source_name: source.name,
                snippet: snippets.get(doc_id).cloned().flatten(),
                mtime: file.mtime,
            });
        }

        Ok(hits)
    }
}

/// Builds the native lexical-index predicate for `filters`. The extension
/// field pushes down whenever exactly one extension is requested; the
/// source dimension pushes down whenever exactly one repository or
/// directory is selected, mirroring `vector_filter_for`'s tie-break. Any
/// filter this can't express (folder prefix, multi-valued lists) is left
/// for `hydrate`'s post-filter.
fn lexical_filter_for(filters: &SearchFilters) -> LexicalFilter {
    let mut filter = LexicalFilter::default();
    if filters.extensions.len() == 1 {
        filter.extension = Some(filters.extensions[0].clone());
    }
    if filters.repositories.len() == 1 && filters.directory_source_ids.is_empty() {
        filter.source_type = Some(SourceType::Repository.as_str().to_string());
        filter.repository_name = Some(filters.repositories[0].clone());
    } else if filters.directory_source_ids.len() == 1 && filters.repositories.is_empty() {
        filter.source_type = Some(SourceType::Directory.as_str().to_string());
        filter.source_id = Some(filters.directory_source_ids[0]);
    }
    filter
}

fn vector_hit_maps(hits: &[VectorHit]) -> (HashMap<String, f64>, HashMap<String, Option<String>>) {
    let mut scores = HashMap::new();
    let mut snippets = HashMap::new();
    for hit in hits {
        scores
            .entry(hit.doc_id.clone())
            .or_insert(hit.score as f64);
        snippets
            .entry(hit.doc_id.clone())
            .or_insert_with(|| hit.snippet.clone());
    }
    (scores, snippets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use codesearch_core::entities::{FileKind, FileRecord, NewSourceOptions, SourceType};
    use codesearch_lexical::{IndexMode, LexicalDocument};
    use codesearch_store::MemoryStore;
    use std::path::PathBuf;

    struct UnreachableEmbedder;

    #[async_trait]
    impl QueryEmbedder for UnreachableEmbedder {
        async fn embed_query(&self, _text: &str) -> Result<Vec<f32>, VectorError> {
            panic!("keyword-only search must never call the embedder");
        }
    }

    fn doc(doc_id: &str, source_id: i64, content: &str) -> LexicalDocument {
        doc_in_repo(doc_id, source_id, "demo", content)
    }

    fn doc_in_repo(doc_id: &str, source_id: i64, repository_name: &str, content: &str) -> LexicalDocument {
        LexicalDocument {
            doc_id: doc_id.to_string(),
            file_name: "main.rs".to_string(),
            folder_name: "src".to_string(),
            content: content.to_string(),
            source_type: "repository".to_string(),
            source_id,
            repository_name: repository_name.to_string(),
            extension: "rs".to_string(),
            mtime: Utc::now(),
            size: content.len() as u64,
        }
    }

    async fn seed_store(store: &MemoryStore, source_id_expected: i64, doc_id: &str) {
        let source = store
            .add_source(
                "/repo",
                "demo",
                SourceType::Repository,
                NewSourceOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(source.source_id, source_id_expected);

        store
            .upsert_file(FileRecord {
                doc_id: doc_id.to_string(),
                source_type: SourceType::Repository,
                source_id: source.source_id,
                absolute_path: PathBuf::from("/repo/src/main.rs"),
                relative_path: "src/main.rs".to_string(),
                size: 42,
                mtime: Utc::now(),
                content_hash: None,
                kind: FileKind::Code,
                last_indexed_at: None,
                last_indexed_hash: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn keyword_mode_never_touches_the_embedder() {
        let lexical = Arc::new(LexicalIndex::create_in_ram().unwrap());
        lexical
            .index_source(1, IndexMode::Full, vec![doc("a", 1, "hybrid fusion engine")])
            .unwrap();

        let store = Arc::new(MemoryStore::new());
        seed_store(&store, 1, "a").await;

        let vector = Arc::new(VectorStore::new("http://localhost:6334", "codesearch").unwrap());
        let engine = HybridSearchEngine::new(
            lexical,
            vector,
            Arc::new(UnreachableEmbedder),
            store,
            RrfConfig::default(),
            3,
        );

        let response = engine
            .search(&SearchQuery {
                text: "fusion".to_string(),
                mode: SearchMode::Keyword,
                limit: 10,
                min_score: 0.0,
                filters: SearchFilters::default(),
            })
            .await
            .unwrap();

        assert_eq!(response.hits.len(), 1);
        assert_eq!(response.hits[0].doc_id, "a");
        assert_eq!(response.hits[0].path, "src/main.rs");
        assert!(!response.degraded);
    }

    #[tokio::test]
    async fn keyword_mode_drops_results_whose_file_record_is_missing() {
        let lexical = Arc::new(LexicalIndex::create_in_ram().unwrap());
        lexical
            .index_source(1, IndexMode::Full, vec![doc("orphan", 1, "search engine")])
            .unwrap();

        let store = Arc::new(MemoryStore::new());
        let vector = Arc::new(VectorStore::new("http://localhost:6334", "codesearch").unwrap());
        let engine = HybridSearchEngine::new(
            lexical,
            vector,
            Arc::new(UnreachableEmbedder),
            store,
            RrfConfig::default(),
            3,
        );

        let response = engine
            .search(&SearchQuery {
                text: "search".to_string(),
                mode: SearchMode::Keyword,
                limit: 10,
                min_score: 0.0,
                filters: SearchFilters::default(),
            })
            .await
            .unwrap();

        assert!(response.hits.is_empty(), "unhydratable result must be dropped, not errored");
    }

    #[tokio::test]
    async fn keyword_mode_applies_source_filter() {
        let lexical = Arc::new(LexicalIndex::create_in_ram().unwrap());
        lexical
            .index_source(1, IndexMode::Full, vec![doc("a", 1, "hybrid fusion engine")])
            .unwrap();

        let store = Arc::new(MemoryStore::new());
        seed_store(&store, 1, "a").await;

        let vector = Arc::new(VectorStore::new("http://localhost:6334", "codesearch").unwrap());
        let engine = HybridSearchEngine::new(
            lexical,
            vector,
            Arc::new(UnreachableEmbedder),
            store,
            RrfConfig::default(),
            3,
        );

        let response = engine
            .search(&SearchQuery {
                text: "fusion".to_string(),
                mode: SearchMode::Keyword,
                limit: 10,
                min_score: 0.0,
                filters: SearchFilters {
                    repositories: vec!["someone-else".to_string()],
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert!(response.hits.is_empty(), "result from a non-selected repository must be filtered out");
    }

    /// A single-repository filter must be pushed into the lexical query
    /// itself, not applied only after retrieval: five more-relevant decoys
    /// from another repository outrank the one matching document, so a
    /// `limit` of 1 would return nothing if filtering happened solely in
    /// `hydrate` against the unfiltered top-1 window.
    #[tokio::test]
    async fn keyword_mode_pushes_single_repository_filter_into_the_lexical_query() {
        let lexical = Arc::new(LexicalIndex::create_in_ram().unwrap());
        let decoys: Vec<LexicalDocument> = (0..5)
            .map(|i| doc_in_repo(&format!("decoy-{i}"), 1, "other-repo", "fusion fusion fusion fusion fusion engine"))
            .collect();
        lexical.index_source(1, IndexMode::Full, decoys).unwrap();
        lexical
            .index_source(2, IndexMode::Full, vec![doc_in_repo("target", 2, "demo-repo", "fusion engine")])
            .unwrap();

        let store = Arc::new(MemoryStore::new());
        let other = store
            .add_source("/other", "other-repo", SourceType::Repository, NewSourceOptions::default())
            .await
            .unwrap();
        assert_eq!(other.source_id, 1);
        let demo = store
            .add_source("/demo", "demo-repo", SourceType::Repository, NewSourceOptions::default())
            .await
            .unwrap();
        assert_eq!(demo.source_id, 2);

        for i in 0..5 {
            store
                .upsert_file(FileRecord {
                    doc_id: format!("decoy-{i}"),
                    source_type: SourceType::Repository,
                    source_id: 1,
                    absolute_path: PathBuf::from(format!("/other/file{i}.rs")),
                    relative_path: format!("file{i}.rs"),
                    size: 10,
                    mtime: Utc::now(),
                    content_hash: None,
                    kind: FileKind::Code,
                    last_indexed_at: None,
                    last_indexed_hash: None,
                })
                .await
                .unwrap();
        }
        store
            .upsert_file(FileRecord {
                doc_id: "target".to_string(),
                source_type: SourceType::Repository,
                source_id: 2,
                absolute_path: PathBuf::from("/demo/src/main.rs"),
                relative_path: "src/main.rs".to_string(),
                size: 10,
                mtime: Utc::now(),
                content_hash: None,
                kind: FileKind::Code,
                last_indexed_at: None,
                last_indexed_hash: None,
            })
            .await
            .unwrap();

        let vector = Arc::new(VectorStore::new("http://localhost:6334", "codesearch").unwrap());
        let engine = HybridSearchEngine::new(
            lexical,
            vector,
            Arc::new(UnreachableEmbedder),
            store,
            RrfConfig::default(),
            3,
        );

        let response = engine
            .search(&SearchQuery {
                text: "fusion".to_string(),
                mode: SearchMode::Keyword,
                limit: 1,
                min_score: 0.0,
                filters: SearchFilters {
                    repositories: vec!["demo-repo".to_string()],
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(response.hits.len(), 1);
        assert_eq!(response.hits[0].doc_id, "target");
    }
}
