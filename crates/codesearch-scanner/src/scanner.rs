//! File scanner (§4.3): enumerates candidate files for one source, applies
//! include/exclude patterns, classifies each by kind, and emits file
//! records. One pass is a fresh, finite walk — not restartable, not cached.

use std::fs;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use codesearch_core::entities::{FileRecord, SourceType};
use codesearch_core::identity::doc_id_for_path;
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use tracing::warn;

use crate::kind::classify;
use crate::error::ScannerError;

const SNIFF_BYTES: usize = 512;

pub struct ScanSource<'a> {
    pub source_id: i64,
    pub source_type: SourceType,
    pub root: &'a Path,
    pub include: &'a [String],
    pub exclude: &'a [String],
    /// Only files modified at or after this time are emitted. `None` means
    /// a full pass.
    pub mtime_floor: Option<DateTime<Utc>>,
}

pub struct ScanOutcome {
    pub records: Vec<FileRecord>,
    /// True when not a single file was observed — the source is marked
    /// with a `scan_failed` event by the caller in that case.
    pub scan_failed: bool,
}

pub fn scan(source: &ScanSource) -> Result<ScanOutcome, ScannerError> {
    let root_canonical = source
        .root
        .canonicalize()
        .map_err(|e| ScannerError::RootUnreadable(e.to_string()))?;

    let mut builder = WalkBuilder::new(source.root);
    // `follow_links(true)` so a symlink's *target* type reaches
    // `entry.file_type()` below; `filter_entry` still rejects any symlink
    // whose resolved target escapes `root_canonical`.
    builder.follow_links(true).hidden(false);

    if !source.include.is_empty() || !source.exclude.is_empty() {
        let mut overrides = OverrideBuilder::new(source.root);
        for pattern in source.include {
            overrides
                .add(pattern)
                .map_err(|e| ScannerError::InvalidPattern(e.to_string()))?;
        }
        for pattern in source.exclude {
            overrides
                .add(&format!("!{pattern}"))
                .map_err(|e| ScannerError::InvalidPattern(e.to_string()))?;
        }
        builder.overrides(
            overrides
                .build()
                .map_err(|e| ScannerError::InvalidPattern(e.to_string()))?,
        );
    }

    let root_for_filter = root_canonical.clone();
    builder.filter_entry(move |entry| {
        if entry.path_is_symlink() {
            return match entry.path().canonicalize() {
                Ok(target) => target.starts_with(&root_for_filter),
                Err(_) => false,
            };
        }
        true
    });

    let mut records = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "scan entry error, skipping");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        match build_record(source, entry.path(), &root_canonical) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "failed to read file during scan, skipping");
            }
        }
    }

    let scan_failed = records.is_empty();
    Ok(ScanOutcome { records, scan_failed })
}

fn build_record(
    source: &ScanSource,
    path: &Path,
    root_canonical: &Path,
) -> std::io::Result<Option<FileRecord>> {
    let metadata = fs::metadata(path)?;
    let mtime: DateTime<Utc> = metadata.modified()?.into();

    if let Some(floor) = source.mtime_floor {
        if mtime < floor {
            return Ok(None);
        }
    }

    let relative_path = path
        .strip_prefix(root_canonical)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string();

    let sniff = if path.extension().is_none() {
        let mut buf = vec![0u8; SNIFF_BYTES];
        let mut file = fs::File::open(path)?;
        let n = file.read(&mut buf)?;
        buf.truncate(n);
        Some(buf)
    } else {
        None
    };
    let kind = classify(path, sniff.as_deref());

    Ok(Some(FileRecord {
        doc_id: doc_id_for_path(path),
        source_type: source.source_type,
        source_id: source.source_id,
        absolute_path: path.to_path_buf(),
        relative_path,
        size: metadata.len(),
        mtime,
        content_hash: None,
        kind,
        last_indexed_at: None,
        last_indexed_hash: None,
    }))
}
