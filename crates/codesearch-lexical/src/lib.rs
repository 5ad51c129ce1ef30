//! Lexical indexer (spec §4.4): the keyword-searchable projection of each
//! file record, backed by tantivy and addressed by the same `doc_id` the
//! metadata store and vector indexer use.

pub mod error;
pub mod index;
pub mod schema;
pub mod search;

pub use error::LexicalError;
pub use index::{IndexMode, LexicalDocument, LexicalIndex};
pub use schema::{build_schema, LexicalFields};
pub use search::{search, LexicalFilter, LexicalHit};
