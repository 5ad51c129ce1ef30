//! Vector indexer (spec §4.5): chunk file content by kind, embed each chunk,
//! and store vectors in qdrant keyed so every chunk of a `doc_id` can be
//! retrieved, deleted, and filtered together.

pub mod chunking;
pub mod embedder;
pub mod error;
pub mod store;

pub use chunking::{chunk_content, TextChunk};
pub use embedder::Embedder;
pub use error::VectorError;
pub use store::{EmbeddedChunk, VectorFilter, VectorHit, VectorStore};
