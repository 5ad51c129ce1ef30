//! SurrealDB-backed [`MetadataStore`] implementation.
//!
//! Tables: `source`, `file_record`, and a single `counters:source` record
//! holding the monotonic `source_id` sequence. Source records are keyed by
//! their numeric `source_id` as the record id; file records are keyed by
//! `doc_id` directly, giving the primary-key semantics §4.1 requires.

use async_trait::async_trait;
use chrono::Utc;
use codesearch_core::entities::{
    FileRecord, IndexOutcome, IndexStats, IndexType, NewSourceOptions, ObservedDocIds, Source,
    SourceChanges, SourceFilter, SourceType,
};
use serde::Deserialize;
use std::path::Path;

use crate::backend::MetadataStore;
use crate::connection::SurrealConnection;
use crate::error::StoreError;

pub struct SurrealStore {
    conn: SurrealConnection,
}

impl SurrealStore {
    pub async fn new(conn: SurrealConnection) -> Result<Self, StoreError> {
        let store = Self { conn };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.conn
            .client()
            .query(
                "DEFINE TABLE IF NOT EXISTS source SCHEMALESS;
                 DEFINE INDEX IF NOT EXISTS source_path ON TABLE source COLUMNS path UNIQUE;
                 DEFINE TABLE IF NOT EXISTS file_record SCHEMALESS;
                 DEFINE INDEX IF NOT EXISTS file_source ON TABLE file_record COLUMNS source_id;
                 DEFINE TABLE IF NOT EXISTS counters SCHEMALESS;",
            )
            .await?;
        Ok(())
    }

    async fn next_source_id(&self) -> Result<i64, StoreError> {
        #[derive(Deserialize)]
        struct Counter {
            next_id: i64,
        }

        let mut response = self
            .conn
            .client()
            .query(
                "UPDATE counters:source SET next_id = (next_id ?? 0) + 1 RETURN next_id;",
            )
            .await?;
        let row: Option<Counter> = response.take(0)?;
        Ok(row.map(|c| c.next_id).unwrap_or(1))
    }

    fn canonicalize(path: &str) -> String {
        Path::new(path)
            .canonicalize()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|_| path.to_string())
    }
}

#[async_trait]
impl MetadataStore for SurrealStore {
    async fn add_source(
        &self,
        path: &str,
        name: &str,
        kind: SourceType,
        options: NewSourceOptions,
    ) -> Result<Source, StoreError> {
        let canonical = Self::canonicalize(path);

        let existing: Vec<Source> = self
            .conn
            .client()
            .query("SELECT * FROM source WHERE path = $path")
            .bind(("path", canonical.clone()))
            .await?
            .take(0)?;
        if !existing.is_empty() {
            return Err(StoreError::AlreadyExists(canonical));
        }

        let source_id = self.next_source_id().await?;
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

        let created: Option<Source> = self
            .conn
            .client()
            .create(("source", source_id.to_string()))
            .content(source.clone())
            .await?;
        created.ok_or_else(|| StoreError::Database("create source returned no row".into()))?;
        Ok(source)
    }

    async fn update_source(
        &self,
        source_id: i64,
        changes: SourceChanges,
    ) -> Result<Source, StoreError> {
        let mut source = self.get_source(source_id).await?;

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

        let updated: Option<Source> = self
            .conn
            .client()
            .update(("source", source_id.to_string()))
            .content(source.clone())
            .await?;
        updated.ok_or(StoreError::SourceNotFound(source_id))?;
        Ok(source)
    }

    async fn delete_source(&self, source_id: i64) -> Result<(), StoreError> {
        let deleted: Option<Source> = self
            .conn
            .client()
            .delete(("source", source_id.to_string()))
            .await?;
        deleted.ok_or(StoreError::SourceNotFound(source_id))?;
        Ok(())
    }

    async fn get_source(&self, source_id: i64) -> Result<Source, StoreError> {
        let source: Option<Source> = self
            .conn
            .client()
            .select(("source", source_id.to_string()))
            .await?;
        source.ok_or(StoreError::SourceNotFound(source_id))
    }

    async fn list_sources(&self, filter: SourceFilter) -> Result<Vec<Source>, StoreError> {
        let mut sources: Vec<Source> = self.conn.client().select("source").await?;
        sources.retain(|s| !filter.enabled_only || s.enabled);
        if let Some(kind) = filter.kind {
            sources.retain(|s| s.source_type == kind);
        }
        sources.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.name.cmp(&b.name)));
        Ok(sources)
    }

    async fn upsert_file(&self, record: FileRecord) -> Result<(), StoreError> {
        // Existence of the source is enforced by the caller (the ingestion
        // pipeline always upserts files for a source it just scanned); a
        // missing source here indicates a logic error upstream, not a user
        // error, so we surface it as NotFound for the caller to decide.
        self.get_source(record.source_id).await?;

        let doc_id = record.doc_id.clone();
        let _: Option<FileRecord> = self
            .conn
            .client()
            .upsert(("file_record", doc_id))
            .content(record)
            .await?;
        Ok(())
    }

    async fn get_file(&self, doc_id: &str) -> Result<FileRecord, StoreError> {
        let record: Option<FileRecord> = self
            .conn
            .client()
            .select(("file_record", doc_id))
            .await?;
        record.ok_or_else(|| StoreError::FileNotFound(doc_id.to_string()))
    }

    async fn list_files_for_source(&self, source_id: i64) -> Result<Vec<FileRecord>, StoreError> {
        let records: Vec<FileRecord> = self
            .conn
            .client()
            .query("SELECT * FROM file_record WHERE source_id = $source_id")
            .bind(("source_id", source_id))
            .await?
            .take(0)?;
        Ok(records)
    }

    async fn delete_files_missing(
        &self,
        source_id: i64,
        observed_doc_ids: &ObservedDocIds,
    ) -> Result<Vec<String>, StoreError> {
        let all = self.list_files_for_source(source_id).await?;
        let mut removed = Vec::new();
        for record in all {
            if !observed_doc_ids.contains(&record.doc_id) {
                let _: Option<FileRecord> = self
                    .conn
                    .client()
                    .delete(("file_record", record.doc_id.clone()))
                    .await?;
                removed.push(record.doc_id);
            }
        }
        Ok(removed)
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
        let mut source = match self.get_source(source_id).await {
            Ok(s) => s,
            Err(_) => {
                tracing::warn!(source_id, "record_index_event for unknown source; dropping");
                return;
            }
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

            if let Err(e) = self
                .conn
                .client()
                .update::<Option<Source>>(("source", source_id.to_string()))
                .content(source)
                .await
            {
                tracing::warn!(source_id, error = %e, "failed to persist index stats");
            }
        } else {
            tracing::warn!(source_id, index_type = index_type.as_str(), "index pass reported failure");
        }
    }
}
