//! SurrealDB connection management.
//!
//! Two embedded modes: `Memory` (no persistence, for tests) and `File`
//! (single-file, `surrealkv`-backed, for the persistent deployment) — see
//! DESIGN.md for why the file engine is safe to enable alongside the
//! onnxruntime-backed embedding path in this workspace.

use std::path::PathBuf;

use surrealdb::engine::local::{Db, Mem, SurrealKv};
use surrealdb::Surreal;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum ConnectionMode {
    /// In-memory, no persistence. Used by tests and ephemeral runs.
    Memory,
    /// Single embedded database file at the given path.
    File(PathBuf),
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to open surrealdb engine: {0}")]
    Open(String),
    #[error("failed to select namespace/database: {0}")]
    Select(String),
    #[error(transparent)]
    Surreal(#[from] surrealdb::Error),
}

/// Wraps an embedded `Surreal<Db>` client with the fixed namespace/database
/// this crate always uses.
pub struct SurrealConnection {
    client: Surreal<Db>,
    mode: ConnectionMode,
}

impl SurrealConnection {
    pub async fn new(mode: ConnectionMode) -> Result<Self, ConnectionError> {
        let client = match &mode {
            ConnectionMode::Memory => {
                info!("opening surrealdb embedded engine in-memory");
                Surreal::new::<Mem>(())
                    .await
                    .map_err(|e| ConnectionError::Open(e.to_string()))?
            }
            ConnectionMode::File(path) => {
                info!(path = %path.display(), "opening surrealdb embedded engine (surrealkv, single file)");
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| ConnectionError::Open(e.to_string()))?;
                }
                Surreal::new::<SurrealKv>(path.to_string_lossy().to_string())
                    .await
                    .map_err(|e| ConnectionError::Open(e.to_string()))?
            }
        };

        client
            .use_ns("codesearch")
            .use_db("metadata")
            .await
            .map_err(|e| ConnectionError::Select(e.to_string()))?;

        debug!("surrealdb connection ready: ns=codesearch db=metadata");
        Ok(Self { client, mode })
    }

    pub fn client(&self) -> &Surreal<Db> {
        &self.client
    }

    pub fn mode(&self) -> &ConnectionMode {
        &self.mode
    }
}
