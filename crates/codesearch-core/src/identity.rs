//! Content identity: deterministic `doc_id` derivation.
//!
//! `doc_id` is a function of the canonicalized absolute path only, never of
//! file content. This keeps the identifier stable across edits so both
//! indexes can overwrite in place instead of tracking a rename.

use std::path::Path;

use base64::Engine as _;
use sha2::{Digest, Sha256};

/// URL-safe, unpadded base64 encoding of a SHA-256 digest.
pub fn doc_id_for_path(path: &Path) -> String {
    let canonical = path
        .canonicalize()
        .unwrap_or_else(|_| path.to_path_buf());
    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest)
}

/// Same as [`doc_id_for_path`] but takes an already-canonicalized path,
/// for callers that canonicalized once and want to avoid a second syscall.
pub fn doc_id_for_canonical_path(canonical_path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_path.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn same_path_same_id_across_calls() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "hello").unwrap();

        let id1 = doc_id_for_path(&file);
        let id2 = doc_id_for_path(&file);
        assert_eq!(id1, id2);
    }

    #[test]
    fn different_paths_different_ids() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "same content").unwrap();
        fs::write(&b, "same content").unwrap();

        assert_ne!(doc_id_for_path(&a), doc_id_for_path(&b));
    }

    #[test]
    fn id_survives_content_change() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "v1").unwrap();
        let id1 = doc_id_for_path(&file);

        fs::write(&file, "v2, totally different content").unwrap();
        let id2 = doc_id_for_path(&file);

        assert_eq!(id1, id2, "doc_id must be content-independent");
    }

    #[test]
    fn id_is_url_safe() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "x").unwrap();
        let id = doc_id_for_path(&file);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert!(!id.contains('='));
    }
}
