//! The indexing pipeline (§4.3-§4.6): scan a source, decide which files
//! changed, re-chunk and re-embed those, write both indexes and the
//! metadata store, and reconcile deletions. Bespoke glue over the already
//! grounded scanner/watcher/lexical/vector/store crates — there is no
//! single teacher file for this composition, since each piece it calls
//! already owns its own behavior and tests.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use codesearch_core::entities::{
    FileKind, FileRecord, IndexOutcome, IndexType, Source, SourceFilter, SourceType,
};
use codesearch_lexical::{IndexMode, LexicalDocument, LexicalIndex};
use codesearch_scanner::{owning_root, scan, ScanSource};
use codesearch_store::{MetadataStore, StoreError};
use codesearch_vector::{chunk_content, EmbeddedChunk, Embedder, VectorStore};
use codesearch_watcher::needs_reindex;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{ServerError, ServerResult};

pub struct ReindexSummary {
    pub source_id: i64,
    pub files_scanned: usize,
    pub files_reindexed: usize,
    pub files_removed: usize,
    pub scan_failed: bool,
}

pub struct IndexingService {
    store: Arc<dyn MetadataStore>,
    lexical: Arc<LexicalIndex>,
    vector: Arc<VectorStore>,
    embedder: Arc<Mutex<Embedder>>,
    max_chunk_chars: usize,
    chunk_overlap_chars: usize,
}

impl IndexingService {
    pub fn new(
        store: Arc<dyn MetadataStore>,
        lexical: Arc<LexicalIndex>,
        vector: Arc<VectorStore>,
        embedder: Arc<Mutex<Embedder>>,
        max_chunk_chars: usize,
        chunk_overlap_chars: usize,
    ) -> Self {
        Self {
            store,
            lexical,
            vector,
            embedder,
            max_chunk_chars,
            chunk_overlap_chars,
        }
    }

    /// Scans `source`, re-indexes every file that changed since it was last
    /// indexed (or every file, if `force_full` asks for an unconditional
    /// rebuild), and removes index entries for files no longer observed on
    /// disk.
    pub async fn reindex_source(
        &self,
        source: &Source,
        include: Vec<String>,
        exclude: Vec<String>,
        force_full: bool,
    ) -> ServerResult<ReindexSummary> {
        let started = Instant::now();
        let root = source.path.clone();
        let source_id = source.source_id;
        let source_type = source.source_type;

        let outcome = tokio::task::spawn_blocking(move || {
            let scan_source = ScanSource {
                source_id,
                source_type,
                root: &root,
                include: &include,
                exclude: &exclude,
                mtime_floor: None,
            };
            scan(&scan_source)
        })
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
        .map_err(|e| ServerError::Scan(e.to_string()))?;

        let scan_failed = outcome.scan_failed;
        let files_scanned = outcome.records.len();
        let records = self.partition_by_ownership(source, outcome.records).await?;
        let mut files_reindexed = 0usize;
        let mut bytes_indexed = 0u64;
        let mut lexical_docs = Vec::new();
        let mut observed_doc_ids: HashSet<String> = HashSet::new();

        for mut record in records {
            observed_doc_ids.insert(record.doc_id.clone());

            let changed = if force_full {
                true
            } else {
                let stored = match self.store.get_file(&record.doc_id).await {
                    Ok(stored) => Some(stored),
                    Err(StoreError::FileNotFound(_)) => None,
                    Err(e) => return Err(ServerError::Store(e)),
                };
                needs_reindex(stored.as_ref(), &record, None)
            };
            if !changed {
                continue;
            }

            let Some(content) = read_text(&record.absolute_path) else {
                continue;
            };
            bytes_indexed += record.size;

            if !matches!(record.kind, FileKind::Unknown) {
                self.index_vector_chunks(&record, &content).await?;
            }

            lexical_docs.push(lexical_document(source, &record, &content));

            record.last_indexed_at = Some(chrono::Utc::now());
            self.store.upsert_file(record).await?;
            files_reindexed += 1;
        }

        if !lexical_docs.is_empty() || force_full {
            let mode = if force_full { IndexMode::Full } else { IndexMode::Incremental };
            let lexical = self.lexical.clone();
            tokio::task::spawn_blocking(move || lexical.index_source(source_id, mode, lexical_docs))
                .await
                .map_err(|e| ServerError::Internal(e.to_string()))?
                .map_err(|e| ServerError::Lexical(e.to_string()))?;
        }

        let removed = self
            .store
            .delete_files_missing(source_id, &observed_doc_ids)
            .await?;
        let files_removed = removed.len();
        if !removed.is_empty() {
            let lexical = self.lexical.clone();
            let to_delete = removed.clone();
            tokio::task::spawn_blocking(move || lexical.delete_by_doc_ids(&to_delete))
                .await
                .map_err(|e| ServerError::Internal(e.to_string()))?
                .map_err(|e| ServerError::Lexical(e.to_string()))?;
            self.vector
                .delete_by_doc_ids(&removed)
                .await
                .map_err(|e| ServerError::Vector(e.to_string()))?;
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        let event_outcome = if scan_failed { IndexOutcome::Failure } else { IndexOutcome::Success };
        self.store
            .record_index_event(source_id, IndexType::Lexical, event_outcome, duration_ms, files_reindexed as u64, bytes_indexed)
            .await;
        self.store
            .record_index_event(source_id, IndexType::Vector, event_outcome, duration_ms, files_reindexed as u64, bytes_indexed)
            .await;

        if scan_failed {
            warn!(source_id, "scan observed zero files");
        }
        info!(source_id, files_scanned, files_reindexed, files_removed, "reindex pass complete");

        Ok(ReindexSummary {
            source_id,
            files_scanned,
            files_reindexed,
            files_removed,
            scan_failed,
        })
    }

    /// Drops any scanned record this source doesn't actually own under the
    /// longest-prefix tie-break (§4.3), so overlapping registered sources
    /// never double-index the same file. A record with no resolvable owner
    /// (a registered root that no longer canonicalizes) is kept, since
    /// excluding it would silently stop indexing a source with no overlap.
    async fn partition_by_ownership(
        &self,
        source: &Source,
        records: Vec<FileRecord>,
    ) -> ServerResult<Vec<FileRecord>> {
        let own_root = match source.path.canonicalize() {
            Ok(p) => p,
            Err(_) => return Ok(records),
        };

        let all_sources = self
            .store
            .list_sources(SourceFilter {
                enabled_only: true,
                kind: None,
            })
            .await?;
        let canonical_roots: Vec<PathBuf> = all_sources
            .iter()
            .filter_map(|s| s.path.canonicalize().ok())
            .collect();

        Ok(filter_owned_records(&own_root, &canonical_roots, records))
    }

    async fn index_vector_chunks(&self, record: &FileRecord, content: &str) -> ServerResult<()> {
        let chunks = chunk_content(content, record.kind, self.max_chunk_chars, self.chunk_overlap_chars);
        if chunks.is_empty() {
            return self
                .vector
                .upsert_doc(&record.doc_id, record.source_type.as_str(), record.source_id, Vec::new())
                .await
                .map_err(|e| ServerError::Vector(e.to_string()));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = {
            let mut embedder = self.embedder.lock().await;
            embedder.embed_batch(&texts).map_err(|e| ServerError::Vector(e.to_string()))?
        };

        let embedded: Vec<EmbeddedChunk> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| EmbeddedChunk { chunk, vector })
            .collect();

        self.vector
            .upsert_doc(&record.doc_id, record.source_type.as_str(), record.source_id, embedded)
            .await
            .map_err(|e| ServerError::Vector(e.to_string()))
    }
}

fn lexical_document(source: &Source, record: &FileRecord, content: &str) -> LexicalDocument {
    let file_name = record
        .absolute_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let folder_name = record
        .absolute_path
        .parent()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = record
        .absolute_path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    let repository_name = match record.source_type {
        SourceType::Repository => source.name.clone(),
        SourceType::Directory => String::new(),
    };

    LexicalDocument {
        doc_id: record.doc_id.clone(),
        file_name,
        folder_name,
        content: content.to_string(),
        source_type: record.source_type.as_str().to_string(),
        source_id: record.source_id,
        repository_name,
        extension,
        mtime: record.mtime,
        size: record.size,
    }
}

fn read_text(path: &PathBuf) -> Option<String> {
    std::fs::read(path).ok().map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

/// Keeps only the records `own_root` owns under the longest-prefix
/// tie-break against every other registered root in `all_roots`. A record
/// outside every known root is kept rather than dropped.
fn filter_owned_records(own_root: &std::path::Path, all_roots: &[PathBuf], records: Vec<FileRecord>) -> Vec<FileRecord> {
    if all_roots.len() <= 1 {
        return records;
    }
    let roots: Vec<&std::path::Path> = all_roots.iter().map(PathBuf::as_path).collect();
    records
        .into_iter()
        .filter(|record| match owning_root(&roots, &record.absolute_path) {
            Some(owner) => owner == own_root,
            None => true,
        })
        .collect()
}
