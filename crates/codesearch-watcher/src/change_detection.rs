//! Change detection rule for incremental passes (§4.6).

use codesearch_core::entities::FileRecord;

/// Whether `scanned` (the record just produced by a fresh scan) requires
/// re-indexing relative to `stored` (the record last persisted by the
/// metadata store). `recomputed_hash` is the caller's optional content hash,
/// consulted only when present — the hash check exists for the case where
/// mtime is unreliable (clock skew, restore from backup) and callers decide
/// when that cost is worth paying.
pub fn needs_reindex(
    stored: Option<&FileRecord>,
    scanned: &FileRecord,
    recomputed_hash: Option<&str>,
) -> bool {
    let Some(stored) = stored else {
        return true;
    };

    if stored.last_indexed_at.is_none() {
        return true;
    }
    if scanned.mtime != stored.mtime {
        return true;
    }
    if scanned.size != stored.size {
        return true;
    }
    if let Some(hash) = recomputed_hash {
        if stored.last_indexed_hash.as_deref() != Some(hash) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use codesearch_core::entities::{FileKind, SourceType};

    fn record(mtime: chrono::DateTime<Utc>, size: u64, last_indexed_at: Option<chrono::DateTime<Utc>>) -> FileRecord {
        FileRecord {
            doc_id: "doc".to_string(),
            source_type: SourceType::Directory,
            source_id: 1,
            absolute_path: "/tmp/a".into(),
            relative_path: "a".to_string(),
            size,
            mtime,
            content_hash: None,
            kind: FileKind::PlainText,
            last_indexed_at,
            last_indexed_hash: None,
        }
    }

    #[test]
    fn new_file_always_needs_reindex() {
        let scanned = record(Utc::now(), 10, None);
        assert!(needs_reindex(None, &scanned, None));
    }

    #[test]
    fn never_indexed_needs_reindex_even_if_otherwise_identical() {
        let now = Utc::now();
        let stored = record(now, 10, None);
        let scanned = record(now, 10, None);
        assert!(needs_reindex(Some(&stored), &scanned, None));
    }

    #[test]
    fn unchanged_mtime_and_size_skips_reindex() {
        let now = Utc::now();
        let stored = record(now, 10, Some(now));
        let scanned = record(now, 10, None);
        assert!(!needs_reindex(Some(&stored), &scanned, None));
    }

    #[test]
    fn differing_mtime_triggers_reindex() {
        let now = Utc::now();
        let stored = record(now, 10, Some(now));
        let scanned = record(now + chrono::Duration::seconds(1), 10, None);
        assert!(needs_reindex(Some(&stored), &scanned, None));
    }

    #[test]
    fn differing_size_triggers_reindex_even_with_same_mtime() {
        let now = Utc::now();
        let stored = record(now, 10, Some(now));
        let scanned = record(now, 20, None);
        assert!(needs_reindex(Some(&stored), &scanned, None));
    }

    #[test]
    fn hash_mismatch_triggers_reindex_when_checked() {
        let now = Utc::now();
        let mut stored = record(now, 10, Some(now));
        stored.last_indexed_hash = Some("abc".to_string());
        let scanned = record(now, 10, None);
        assert!(needs_reindex(Some(&stored), &scanned, Some("def")));
    }
}
