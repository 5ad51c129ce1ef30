//! Configuration management for `codesearch`.
//!
//! Loads a layered configuration: an optional `config.toml` in the data
//! directory, overlaid by `CODESEARCH_*` environment variables, deserialized
//! into one typed [`AppConfig`]. Also owns process-wide logging
//! initialization so the binary crate has a single entry point for both.

pub mod error;
pub mod logging;
pub mod manager;
pub mod types;

pub use error::{ConfigError, Result};
pub use logging::init_logging;
pub use manager::ConfigManager;
pub use types::{AppConfig, EmbeddingConfig, LlmConfig, QdrantConfig, SearchConfig, WatcherConfig};
