//! The repository trait implemented by both the in-memory and SurrealDB
//! backends. The two indexers never implement this trait — they hold
//! derived state and treat the metadata store as authoritative.

use async_trait::async_trait;
use codesearch_core::entities::{
    FileRecord, IndexOutcome, IndexType, NewSourceOptions, ObservedDocIds, Source, SourceChanges,
    SourceFilter, SourceType,
};

use crate::error::StoreError;

#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn add_source(
        &self,
        path: &str,
        name: &str,
        kind: SourceType,
        options: NewSourceOptions,
    ) -> Result<Source, StoreError>;

    async fn update_source(
        &self,
        source_id: i64,
        changes: SourceChanges,
    ) -> Result<Source, StoreError>;

    async fn delete_source(&self, source_id: i64) -> Result<(), StoreError>;

    async fn get_source(&self, source_id: i64) -> Result<Source, StoreError>;

    async fn list_sources(&self, filter: SourceFilter) -> Result<Vec<Source>, StoreError>;

    async fn upsert_file(&self, record: FileRecord) -> Result<(), StoreError>;

    async fn get_file(&self, doc_id: &str) -> Result<FileRecord, StoreError>;

    async fn list_files_for_source(&self, source_id: i64) -> Result<Vec<FileRecord>, StoreError>;

    /// Removes any file record for `source_id` whose `doc_id` is not in
    /// `observed_doc_ids`, returning the removed set so callers can delete
    /// the same identifiers from both indexes.
    async fn delete_files_missing(
        &self,
        source_id: i64,
        observed_doc_ids: &ObservedDocIds,
    ) -> Result<Vec<String>, StoreError>;

    /// Never fails the caller: stats-update failures are logged, not
    /// propagated, per §4.1.
    async fn record_index_event(
        &self,
        source_id: i64,
        index_type: IndexType,
        outcome: IndexOutcome,
        duration_ms: u64,
        files_indexed: u64,
        bytes_indexed: u64,
    );
}
