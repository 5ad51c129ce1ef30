//! Unified source registry: repositories and ad-hoc directories behind one
//! interface, backed by the metadata store.

use std::path::Path;
use std::sync::Arc;

use codesearch_core::entities::{NewSourceOptions, Source, SourceChanges, SourceFilter};
use codesearch_store::MetadataStore;
use tracing::{info, warn};

use crate::discovery::classify;
use crate::error::RegistryError;

pub struct SourceRegistry {
    store: Arc<dyn MetadataStore>,
}

impl SourceRegistry {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self { store }
    }

    /// Registers `path` as a source. The kind (repository vs. directory) is
    /// auto-detected from the presence of a `.git` marker unless the caller
    /// overrides it. Overlap with an existing source (ancestor or
    /// descendant) is permitted — ownership is resolved by the scanner's
    /// longest-prefix tie-break, not rejected here.
    pub async fn register(
        &self,
        path: &str,
        name: &str,
        options: NewSourceOptions,
    ) -> Result<Source, RegistryError> {
        let fs_path = Path::new(path);
        if !fs_path.exists() {
            return Err(RegistryError::PathNotFound(path.to_string()));
        }
        if !fs_path.is_dir() {
            return Err(RegistryError::NotADirectory(path.to_string()));
        }

        self.warn_on_overlap(fs_path).await;

        let kind = classify(fs_path);
        let source = self.store.add_source(path, name, kind, options).await?;
        info!(source_id = source.source_id, path, kind = ?source.source_type, "source registered");
        Ok(source)
    }

    /// Logs at `warn` when `path` is an ancestor or descendant of an
    /// already-registered, enabled source. Registration still proceeds —
    /// ownership of the overlap is resolved later by the scanner's
    /// longest-prefix tie-break, not decided here.
    async fn warn_on_overlap(&self, fs_path: &Path) {
        let Ok(candidate) = fs_path.canonicalize() else {
            return;
        };
        let Ok(existing) = self
            .store
            .list_sources(SourceFilter { enabled_only: true, kind: None })
            .await
        else {
            return;
        };

        for source in &existing {
            let Ok(other) = source.path.canonicalize() else {
                continue;
            };
            if candidate == other || candidate.starts_with(&other) || other.starts_with(&candidate) {
                warn!(
                    source_id = source.source_id,
                    existing_path = %other.display(),
                    new_path = %candidate.display(),
                    "registering a source that overlaps an existing source"
                );
            }
        }
    }

    pub async fn update(
        &self,
        source_id: i64,
        changes: SourceChanges,
    ) -> Result<Source, RegistryError> {
        Ok(self.store.update_source(source_id, changes).await?)
    }

    /// Removes a source from the registry. File records and index entries
    /// are left in place; a separate purge is a deliberate, explicit
    /// operation, not an implicit side effect of removal.
    pub async fn remove(&self, source_id: i64) -> Result<(), RegistryError> {
        self.store.delete_source(source_id).await?;
        Ok(())
    }

    pub async fn get(&self, source_id: i64) -> Result<Source, RegistryError> {
        Ok(self.store.get_source(source_id).await?)
    }

    pub async fn list(&self, filter: SourceFilter) -> Result<Vec<Source>, RegistryError> {
        Ok(self.store.list_sources(filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codesearch_store::MemoryStore;

    fn registry() -> SourceRegistry {
        SourceRegistry::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn register_detects_repository_kind_from_git_marker() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let reg = registry();

        let source = reg
            .register(
                dir.path().to_str().unwrap(),
                "repo",
                NewSourceOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(source.source_type, codesearch_core::entities::SourceType::Repository);
    }

    #[tokio::test]
    async fn register_rejects_nonexistent_path() {
        let reg = registry();
        let err = reg
            .register("/definitely/not/a/real/path", "x", NewSourceOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::PathNotFound(_)));
    }

    #[tokio::test]
    async fn register_allows_overlapping_sources() {
        let dir = tempfile::TempDir::new().unwrap();
        let child = dir.path().join("child");
        std::fs::create_dir(&child).unwrap();
        let reg = registry();

        reg.register(dir.path().to_str().unwrap(), "parent", NewSourceOptions::default())
            .await
            .unwrap();
        let nested = reg
            .register(child.to_str().unwrap(), "child", NewSourceOptions::default())
            .await
            .unwrap();

        assert_eq!(nested.name, "child");
    }

    #[tokio::test]
    async fn remove_does_not_error_when_file_records_exist() {
        let dir = tempfile::TempDir::new().unwrap();
        let reg = registry();
        let source = reg
            .register(dir.path().to_str().unwrap(), "a", NewSourceOptions::default())
            .await
            .unwrap();
        reg.remove(source.source_id).await.unwrap();
        assert!(reg.get(source.source_id).await.is_err());
    }
}
