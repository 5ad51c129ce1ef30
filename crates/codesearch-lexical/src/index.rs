//! Tantivy-backed lexical index: batched writes with retry, deletion by
//! `doc_id`, and the index lifecycle (§4.4).

use std::path::Path;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tantivy::directory::MmapDirectory;
use tantivy::schema::Value;
use tantivy::{doc, Index, IndexWriter, Term};
use tracing::{info, warn};

use crate::error::LexicalError;
use crate::schema::{build_schema, LexicalFields};

const WRITER_HEAP_BYTES: usize = 50_000_000;
const MAX_COMMIT_RETRIES: u32 = 4;
const BATCH_SIZE: usize = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    Full,
    Incremental,
}

#[derive(Debug, Clone)]
pub struct LexicalDocument {
    pub doc_id: String,
    pub file_name: String,
    pub folder_name: String,
    pub content: String,
    pub source_type: String,
    pub source_id: i64,
    pub repository_name: String,
    pub extension: String,
    pub mtime: DateTime<Utc>,
    pub size: u64,
}

pub struct LexicalIndex {
    index: Index,
    fields: LexicalFields,
}

impl LexicalIndex {
    pub fn open_or_create(path: &Path) -> Result<Self, LexicalError> {
        std::fs::create_dir_all(path)?;
        let (schema, fields) = build_schema();
        let dir = MmapDirectory::open(path)?;
        let index = Index::open_or_create(dir, schema)?;
        Ok(Self { index, fields })
    }

    pub fn create_in_ram() -> Result<Self, LexicalError> {
        let (schema, fields) = build_schema();
        let index = Index::create_in_ram(schema);
        Ok(Self { index, fields })
    }

    pub fn fields(&self) -> &LexicalFields {
        &self.fields
    }

    pub fn tantivy_index(&self) -> &Index {
        &self.index
    }

    /// Indexes `documents` for one source. In `Full` mode, every document
    /// previously written for `source_id` is deleted first so a full pass
    /// never leaves stale documents behind; in `Incremental` mode, each
    /// document is upserted by `doc_id` individually. Writes are chunked
    /// into batches; each batch commit is retried with bounded exponential
    /// backoff. Already-committed batches are left in place if a later
    /// batch exhausts its retries — the lexical index stays eventually
    /// consistent with the metadata store rather than rolling back.
    pub fn index_source(
        &self,
        source_id: i64,
        mode: IndexMode,
        documents: Vec<LexicalDocument>,
    ) -> Result<usize, LexicalError> {
        let mut writer: IndexWriter = self.index.writer(WRITER_HEAP_BYTES)?;

        if mode == IndexMode::Full {
            writer.delete_term(Term::from_field_i64(self.fields.source_id, source_id));
            self.commit_with_retry(&mut writer)?;
        }

        let mut committed = 0;
        for batch in documents.chunks(BATCH_SIZE) {
            for document in batch {
                if mode == IndexMode::Incremental {
                    writer.delete_term(Term::from_field_text(self.fields.doc_id, &document.doc_id));
                }
                writer.add_document(self.to_tantivy_doc(document))?;
            }
            self.commit_with_retry(&mut writer)?;
            committed += batch.len();
        }

        Ok(committed)
    }

    pub fn delete_by_doc_ids(&self, doc_ids: &[String]) -> Result<(), LexicalError> {
        let mut writer: IndexWriter = self.index.writer(WRITER_HEAP_BYTES)?;
        for doc_id in doc_ids {
            writer.delete_term(Term::from_field_text(self.fields.doc_id, doc_id));
        }
        self.commit_with_retry(&mut writer)
    }

    fn commit_with_retry(&self, writer: &mut IndexWriter) -> Result<(), LexicalError> {
        let mut attempt = 0;
        loop {
            match writer.commit() {
                Ok(_) => return Ok(()),
                Err(e) if attempt < MAX_COMMIT_RETRIES => {
                    let backoff = Duration::from_millis(100 * 2u64.pow(attempt));
                    warn!(attempt, error = %e, "lexical commit failed, retrying after backoff");
                    thread::sleep(backoff);
                    attempt += 1;
                }
                Err(e) => {
                    return Err(LexicalError::BatchWriteExhausted(e.to_string()));
                }
            }
        }
    }

    fn to_tantivy_doc(&self, document: &LexicalDocument) -> tantivy::TantivyDocument {
        let f = &self.fields;
        doc!(
            f.doc_id => document.doc_id.clone(),
            f.file_name => document.file_name.clone(),
            f.folder_name => document.folder_name.clone(),
            f.content => document.content.clone(),
            f.source_type => document.source_type.clone(),
            f.source_id => document.source_id,
            f.repository_name => document.repository_name.clone(),
            f.extension => document.extension.clone(),
            f.mtime => tantivy::DateTime::from_timestamp_secs(document.mtime.timestamp()),
            f.size => document.size,
        )
    }
}
