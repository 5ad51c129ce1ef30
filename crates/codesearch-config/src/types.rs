//! Typed configuration structures.

use serde::{Deserialize, Serialize};

/// Top-level application configuration, loaded once at startup and held as
/// an immutable snapshot for the lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the metadata store file, template directory, and
    /// any embedded-index state.
    pub data_dir: String,
    /// HTTP listen port for the `serve` subcommand.
    pub port: u16,
    /// `tracing` filter directive, e.g. `"info"` or `"codesearch=debug"`.
    pub log_level: String,
    pub search: SearchConfig,
    pub embedding: EmbeddingConfig,
    pub qdrant: QdrantConfig,
    pub llm: LlmConfig,
    pub watcher: WatcherConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: "./.codesearch".to_string(),
            port: 8787,
            log_level: "info".to_string(),
            search: SearchConfig::default(),
            embedding: EmbeddingConfig::default(),
            qdrant: QdrantConfig::default(),
            llm: LlmConfig::default(),
            watcher: WatcherConfig::default(),
        }
    }
}

/// Hybrid search fusion weights and smoothing constant. Defaults per §4.7:
/// `w_k = 0.4`, `w_s = 0.6`, `k ≈ 60`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub keyword_weight: f64,
    pub vector_weight: f64,
    pub rrf_k: f64,
    pub default_limit: u32,
    pub overfetch_multiplier: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            keyword_weight: 0.4,
            vector_weight: 0.6,
            rrf_k: 60.0,
            default_limit: 20,
            overfetch_multiplier: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model_id: String,
    pub max_input_tokens: usize,
    pub max_chunk_chars: usize,
    pub chunk_overlap_chars: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_id: "BAAI/bge-small-en-v1.5".to_string(),
            max_input_tokens: 512,
            max_chunk_chars: 2000,
            chunk_overlap_chars: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QdrantConfig {
    pub url: String,
    pub collection: String,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            collection: "codesearch_chunks".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "none".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WatcherConfig {
    pub debounce_ms: u64,
    pub max_batch_size: usize,
    /// Upper bound on reindex passes running at once across all watched
    /// sources (§5): ingestion passes for different sources may run in
    /// parallel, but only up to this many at a time.
    pub max_concurrent_reindexes: usize,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 3000,
            max_batch_size: 500,
            max_concurrent_reindexes: 4,
        }
    }
}
