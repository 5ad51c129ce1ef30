//! Thread-safe in-memory implementation of [`MetadataStore`].
//!
//! Used for tests and for a dependency-free development mode. Suitable as
//! the sole backend wherever persistence across restarts is not required.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use codesearch_core::entities::{
    FileRecord, IndexOutcome, IndexStats, IndexType, NewSourceOptions, ObservedDocIds, Source,
    SourceChanges, SourceFilter, SourceType,
};
use parking_lot::RwLock;

use crate::backend::MetadataStore;
use crate::error::StoreError;

#[derive(Default)]
struct State {
    sources: HashMap<i64, Source>,
    files: HashMap<String, FileRecord>,
}

pub struct MemoryStore {
    state: RwLock<State>,
    next_source_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            next_source_id: AtomicI64::new(1),
        }
    }

    fn canonicalize(path: &str) -> String {
        Path::new(path)
            .canonicalize()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|_| path.to_string())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataStore for MemoryStore {
    async fn add_source(
        &self,
        path: &str,
        name: &str,
        kind: SourceType,
        options: NewSourceOptions,
    ) -> Result<Source, StoreError> {
        let canonical = Self::canonicalize(path);
        let mut state = self.state.write();

        if state.sources.values().any(|s| s.path.to_string_lossy() == canonical) {
            return Err(StoreError::AlreadyExists(canonical));
        }

        let source_id = self.next_source_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let source = Source {
            source_id,
            source_type: kind,
            path: canonical.into(),
            name: name.to_string(),
            enabled: true,
            auto_reindex: options.auto_reindex,
            priority: options.priority,
            notes: options.notes,
            created_at: now,
            updated_at: now,
            last_indexed: None,
            lexical_stats: IndexStats::default(),
            vector_stats: IndexStats::default(),
        };
        state.sources.insert(source_id, source.clone());
        Ok(source)
    }

    async fn update_source(
        &self,
        source_id: i64,
        changes: SourceChanges,
    ) -> Result<Source, StoreError> {
        let mut state = self.state.write();
        let source = state
            .sources
            .get_mut(&source_id)
            .ok_or(StoreError::SourceNotFound(source_id))?;

        if let Some(name) = changes.name {
            source.name = name;
        }
        if let Some(enabled) = changes.enabled {
            source.enabled = enabled;
        }
        if let Some(auto_reindex) = changes.auto_reindex {
            source.auto_reindex = auto_reindex;
        }
        if let Some(priority) = changes.priority {
            source.priority = priority;
        }
        if let Some(notes) = changes.notes {
            source.notes = notes;
        }
        source.updated_at = Utc::now();
        Ok(source.clone())
    }

    async fn delete_source(&self, source_id: i64) -> Result<(), StoreError> {
        let mut state = self.state.write();
        state
            .sources
            .remove(&source_id)
            .ok_or(StoreError::SourceNotFound(source_id))?;
        // Stats rows live inline on the Source in this backend, so removing
        // the source cascades them for free. File records are deliberately
        // left in place per §3: deletion does not reap indexed documents.
        Ok(())
    }

    async fn get_source(&self, source_id: i64) -> Result<Source, StoreError> {
        self.state
            .read()
            .sources
            .get(&source_id)
            .cloned()
            .ok_or(StoreError::SourceNotFound(source_id))
    }

    async fn list_sources(&self, filter: SourceFilter) -> Result<Vec<Source>, StoreError> {
        let state = self.state.read();
        let mut sources: Vec<Source> = state
            .sources
            .values()
            .filter(|s| !filter.enabled_only || s.enabled)
            .filter(|s| filter.kind.map(|k| k == s.source_type).unwrap_or(true))
            .cloned()
            .collect();
        sources.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(sources)
    }

    async fn upsert_file(&self, record: FileRecord) -> Result<(), StoreError> {
        let mut state = self.state.write();
        if !state.sources.contains_key(&record.source_id) {
            return Err(StoreError::SourceNotFound(record.source_id));
        }
        state.files.insert(record.doc_id.clone(), record);
        Ok(())
    }

    async fn get_file(&self, doc_id: &str) -> Result<FileRecord, StoreError> {
        self.state
            .read()
            .files
            .get(doc_id)
            .cloned()
            .ok_or_else(|| StoreError::FileNotFound(doc_id.to_string()))
    }

    async fn list_files_for_source(&self, source_id: i64) -> Result<Vec<FileRecord>, StoreError> {
        Ok(self
            .state
            .read()
            .files
            .values()
            .filter(|f| f.source_id == source_id)
            .cloned()
            .collect())
    }

    async fn delete_files_missing(
        &self,
        source_id: i64,
        observed_doc_ids: &ObservedDocIds,
    ) -> Result<Vec<String>, StoreError> {
        let mut state = self.state.write();
        let stale: Vec<String> = state
            .files
            .values()
            .filter(|f| f.source_id == source_id && !observed_doc_ids.contains(&f.doc_id))
            .map(|f| f.doc_id.clone())
            .collect();
        for doc_id in &stale {
            state.files.remove(doc_id);
        }
        Ok(stale)
    }

    async fn record_index_event(
        &self,
        source_id: i64,
        index_type: IndexType,
        outcome: IndexOutcome,
        duration_ms: u64,
        files_indexed: u64,
        bytes_indexed: u64,
    ) {
        let mut state = self.state.write();
        let Some(source) = state.sources.get_mut(&source_id) else {
            tracing::warn!(source_id, "record_index_event for unknown source; dropping");
            return;
        };

        let stats = match index_type {
            IndexType::Lexical => &mut source.lexical_stats,
            IndexType::Vector => &mut source.vector_stats,
        };

        let now = Utc::now();
        if matches!(outcome, IndexOutcome::Success) {
            if stats.initial_indexed_at.is_none() {
                stats.initial_indexed_at = Some(now);
                stats.initial_index_duration_ms = Some(duration_ms);
            }
            stats.last_reindexed_at = Some(now);
            stats.last_reindex_duration_ms = Some(duration_ms);
            stats.total_files = files_indexed;
            stats.total_bytes = bytes_indexed;
            source.last_indexed = Some(now);
        } else {
            tracing::warn!(source_id, index_type = index_type.as_str(), "index pass reported failure");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codesearch_core::entities::FileKind;

    fn sample_file(source_id: i64, doc_id: &str) -> FileRecord {
        FileRecord {
            doc_id: doc_id.to_string(),
            source_type: SourceType::Directory,
            source_id,
            absolute_path: format!("/tmp/{doc_id}").into(),
            relative_path: doc_id.to_string(),
            size: 10,
            mtime: Utc::now(),
            content_hash: None,
            kind: FileKind::PlainText,
            last_indexed_at: None,
            last_indexed_hash: None,
        }
    }

    #[tokio::test]
    async fn add_source_rejects_duplicate_path() {
        let store = MemoryStore::new();
        store
            .add_source("/tmp/a", "a", SourceType::Directory, NewSourceOptions::default())
            .await
            .unwrap();
        let err = store
            .add_source("/tmp/a", "a2", SourceType::Directory, NewSourceOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn list_sources_orders_by_priority_then_name() {
        let store = MemoryStore::new();
        store
            .add_source(
                "/tmp/low",
                "zzz",
                SourceType::Directory,
                NewSourceOptions { priority: 1, ..Default::default() },
            )
            .await
            .unwrap();
        store
            .add_source(
                "/tmp/high",
                "aaa",
                SourceType::Directory,
                NewSourceOptions { priority: 10, ..Default::default() },
            )
            .await
            .unwrap();

        let sources = store.list_sources(SourceFilter::default()).await.unwrap();
        assert_eq!(sources[0].name, "aaa");
        assert_eq!(sources[1].name, "zzz");
    }

    #[tokio::test]
    async fn delete_files_missing_removes_unobserved_and_returns_them() {
        let store = MemoryStore::new();
        let src = store
            .add_source("/tmp/src", "src", SourceType::Directory, NewSourceOptions::default())
            .await
            .unwrap();

        store.upsert_file(sample_file(src.source_id, "keep")).await.unwrap();
        store.upsert_file(sample_file(src.source_id, "drop")).await.unwrap();

        let observed: ObservedDocIds = ["keep".to_string()].into_iter().collect();
        let removed = store.delete_files_missing(src.source_id, &observed).await.unwrap();

        assert_eq!(removed, vec!["drop".to_string()]);
        assert!(store.get_file("keep").await.is_ok());
        assert!(store.get_file("drop").await.is_err());
    }

    #[tokio::test]
    async fn delete_source_does_not_touch_file_records() {
        let store = MemoryStore::new();
        let src = store
            .add_source("/tmp/src", "src", SourceType::Directory, NewSourceOptions::default())
            .await
            .unwrap();
        store.upsert_file(sample_file(src.source_id, "a")).await.unwrap();

        store.delete_source(src.source_id).await.unwrap();

        assert!(store.get_source(src.source_id).await.is_err());
        assert!(store.get_file("a").await.is_ok(), "file records survive source deletion");
    }
}
