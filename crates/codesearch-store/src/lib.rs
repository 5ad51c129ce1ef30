//! Identity and metadata store (spec §4.1).
//!
//! `doc_id` (see [`codesearch_core::identity`]) is the primary key shared by
//! the lexical index, the vector index, and the rows in this crate. Neither
//! indexer is authoritative over source/file bookkeeping — this crate is.
//!
//! Two backends implement [`MetadataStore`]:
//! - [`memory::MemoryStore`] — in-process, used by tests and dependency-free runs.
//! - [`surreal::SurrealStore`] — embedded SurrealDB, `Mem` engine for tests,
//!   `SurrealKv` engine for the single-file persistent deployment.

pub mod backend;
pub mod connection;
pub mod error;
pub mod memory;
pub mod surreal;

pub use backend::MetadataStore;
pub use connection::{ConnectionError, ConnectionMode, SurrealConnection};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use surreal::SurrealStore;
