//! Hybrid search engine (§4.7): fuses keyword and semantic retrieval by
//! reciprocal-rank fusion, then hydrates results against the metadata store.

pub mod engine;
pub mod error;
pub mod filters;
pub mod fusion;

pub use engine::{HybridSearchEngine, QueryEmbedder, SearchHit, SearchMode, SearchQuery, SearchResponse};
pub use error::SearchError;
pub use filters::SearchFilters;
pub use fusion::{fuse, FusedResult, RrfConfig};
