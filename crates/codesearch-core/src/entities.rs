//! Core entities: `Source`, `FileRecord`, `Chunk`, `IndexStats`.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a source is a version-controlled repository or an ad-hoc directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Repository,
    Directory,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Repository => "repository",
            SourceType::Directory => "directory",
        }
    }
}

/// Per-`(source_id, index_type)` statistics. Display-only; never consulted
/// for correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    Lexical,
    Vector,
}

impl IndexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::Lexical => "lexical",
            IndexType::Vector => "vector",
        }
    }
}

/// Outcome of one indexing pass, recorded against a source's stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_files: u64,
    pub total_bytes: u64,
    pub initial_index_duration_ms: Option<u64>,
    pub initial_indexed_at: Option<DateTime<Utc>>,
    pub last_reindex_duration_ms: Option<u64>,
    pub last_reindexed_at: Option<DateTime<Utc>>,
}

/// A registered root (repository or ad-hoc directory) whose files are to be
/// indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub source_id: i64,
    pub source_type: SourceType,
    pub path: PathBuf,
    pub name: String,
    pub enabled: bool,
    pub auto_reindex: bool,
    pub priority: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_indexed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lexical_stats: IndexStats,
    #[serde(default)]
    pub vector_stats: IndexStats,
}

/// Options accepted by `add_source`.
#[derive(Debug, Clone, Default)]
pub struct NewSourceOptions {
    pub priority: i32,
    pub notes: Option<String>,
    pub auto_reindex: bool,
}

/// Partial update accepted by `update_source`. `None` means "leave unchanged".
#[derive(Debug, Clone, Default)]
pub struct SourceChanges {
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub auto_reindex: Option<bool>,
    pub priority: Option<i32>,
    pub notes: Option<Option<String>>,
}

/// Filter accepted by `list_sources`.
#[derive(Debug, Clone, Default)]
pub struct SourceFilter {
    pub enabled_only: bool,
    pub kind: Option<SourceType>,
}

/// One indexable file, owned by exactly one `(source_type, source_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub doc_id: String,
    pub source_type: SourceType,
    pub source_id: i64,
    pub absolute_path: PathBuf,
    pub relative_path: String,
    pub size: u64,
    pub mtime: DateTime<Utc>,
    pub content_hash: Option<String>,
    pub kind: FileKind,
    pub last_indexed_at: Option<DateTime<Utc>>,
    pub last_indexed_hash: Option<String>,
}

/// File kind classification, used to pick a chunking strategy and a ranking
/// weight, not to restrict indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Code,
    StructuredDoc,
    PlainText,
    Unknown,
}

/// A bounded slice of a file used as the unit of embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub doc_id: String,
    pub ordinal: u32,
    pub byte_start: usize,
    pub byte_end: usize,
    pub text: String,
    /// Absent until embedded; present when read back from the vector store.
    pub embedding: Option<Vec<f32>>,
}

/// The set of `doc_id`s observed during one scanner pass, used by
/// `delete_files_missing`.
pub type ObservedDocIds = HashSet<String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_type_round_trips_through_str() {
        assert_eq!(SourceType::Repository.as_str(), "repository");
        assert_eq!(SourceType::Directory.as_str(), "directory");
    }
}
