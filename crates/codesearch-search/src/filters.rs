//! Filter algebra (§4.7): repository-name and directory-`source_id` filters
//! union within the source dimension; folder-prefix and extension filters
//! intersect with that union.
//!
//! The underlying lexical and vector indexes only accept a single
//! `source_id`/`repository_name` term each, so admission is evaluated here
//! against hydrated metadata after retrieval rather than pushed down as a
//! compound query predicate.

use codesearch_core::entities::{FileRecord, Source, SourceType};

#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub repositories: Vec<String>,
    pub directory_source_ids: Vec<i64>,
    pub folder_prefix: Option<String>,
    pub extensions: Vec<String>,
}

impl SearchFilters {
    fn has_source_filter(&self) -> bool {
        !self.repositories.is_empty() || !self.directory_source_ids.is_empty()
    }

    /// Whether `file` (owned by `source`) is admissible under this filter set.
    pub fn admits(&self, source: &Source, file: &FileRecord) -> bool {
        let source_ok = if !self.has_source_filter() {
            true
        } else {
            match source.source_type {
                SourceType::Repository => self.repositories.iter().any(|r| r == &source.name),
                SourceType::Directory => self.directory_source_ids.contains(&source.source_id),
            }
        };

        let folder_ok = self
            .folder_prefix
            .as_deref()
            .map(|prefix| file.relative_path.starts_with(prefix))
            .unwrap_or(true);

        let ext_ok = if self.extensions.is_empty() {
            true
        } else {
            let extension = file
                .relative_path
                .rsplit('.')
                .next()
                .unwrap_or_default();
            self.extensions.iter().any(|e| e == extension)
        };

        source_ok && folder_ok && ext_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use codesearch_core::entities::{FileKind, IndexStats};
    use std::path::PathBuf;

    fn repo(name: &str, source_id: i64) -> Source {
        Source {
            source_id,
            source_type: SourceType::Repository,
            path: PathBuf::from("/repo"),
            name: name.to_string(),
            enabled: true,
            auto_reindex: true,
            priority: 0,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_indexed: None,
            lexical_stats: IndexStats::default(),
            vector_stats: IndexStats::default(),
        }
    }

    fn directory(source_id: i64) -> Source {
        let mut s = repo("some-dir", source_id);
        s.source_type = SourceType::Directory;
        s
    }

    fn file(source: &Source, relative_path: &str) -> FileRecord {
        FileRecord {
            doc_id: format!("{}:{relative_path}", source.source_id),
            source_type: source.source_type,
            source_id: source.source_id,
            absolute_path: PathBuf::from(relative_path),
            relative_path: relative_path.to_string(),
            size: 10,
            mtime: Utc::now(),
            content_hash: None,
            kind: FileKind::Code,
            last_indexed_at: None,
            last_indexed_hash: None,
        }
    }

    #[test]
    fn empty_filter_admits_everything() {
        let s = repo("a", 1);
        let f = file(&s, "src/main.rs");
        assert!(SearchFilters::default().admits(&s, &f));
    }

    #[test]
    fn repository_name_and_directory_id_union_within_source_dimension() {
        let filters = SearchFilters {
            repositories: vec!["a".to_string()],
            directory_source_ids: vec![9],
            ..Default::default()
        };
        let repo_a = repo("a", 1);
        let repo_b = repo("b", 2);
        let dir_9 = directory(9);

        assert!(filters.admits(&repo_a, &file(&repo_a, "x")));
        assert!(!filters.admits(&repo_b, &file(&repo_b, "x")));
        assert!(filters.admits(&dir_9, &file(&dir_9, "x")));
    }

    #[test]
    fn folder_prefix_intersects_with_source_filter() {
        let filters = SearchFilters {
            repositories: vec!["a".to_string()],
            folder_prefix: Some("src/".to_string()),
            ..Default::default()
        };
        let s = repo("a", 1);
        assert!(filters.admits(&s, &file(&s, "src/main.rs")));
        assert!(!filters.admits(&s, &file(&s, "docs/readme.md")));
    }

    #[test]
    fn extension_filter_matches_file_suffix() {
        let filters = SearchFilters {
            extensions: vec!["rs".to_string()],
            ..Default::default()
        };
        let s = repo("a", 1);
        assert!(filters.admits(&s, &file(&s, "src/main.rs")));
        assert!(!filters.admits(&s, &file(&s, "src/main.py")));
    }
}
