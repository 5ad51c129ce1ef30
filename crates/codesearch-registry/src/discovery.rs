//! Repository detection and bounded-depth subdirectory discovery.
//!
//! Discovery is read-only: it never touches the registry, it only answers
//! "what's here" for UI tree pickers and for classifying a path at
//! registration time.

use std::fs;
use std::path::{Path, PathBuf};

use codesearch_core::entities::SourceType;

/// A repository is a source whose root contains a version-control marker.
/// We check for `.git` directly rather than opening the repository with
/// `git2`, since classification must work even for bare or unusual layouts
/// and must never fail the caller.
pub fn classify(path: &Path) -> SourceType {
    if path.join(".git").exists() {
        SourceType::Repository
    } else {
        SourceType::Directory
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveredEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_repository: bool,
}

/// Enumerates subdirectories under `root` up to `max_depth` levels, for UI
/// tree pickers. Hidden directories (dotfiles) are skipped except `.git`
/// itself, which is never descended into.
pub fn discover_subdirectories(root: &Path, max_depth: u32) -> Vec<DiscoveredEntry> {
    let mut out = Vec::new();
    walk(root, 0, max_depth, &mut out);
    out
}

fn walk(dir: &Path, depth: u32, max_depth: u32, out: &mut Vec<DiscoveredEntry>) {
    if depth >= max_depth {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }

        let is_repository = matches!(classify(&path), SourceType::Repository);
        out.push(DiscoveredEntry {
            path: path.clone(),
            name,
            is_repository,
        });

        if !is_repository {
            walk(&path, depth + 1, max_depth, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn classifies_directory_with_git_marker_as_repository() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        assert_eq!(classify(dir.path()), SourceType::Repository);
    }

    #[test]
    fn classifies_plain_directory_as_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(classify(dir.path()), SourceType::Directory);
    }

    #[test]
    fn discovery_skips_hidden_directories_and_stops_at_repository_roots() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".hidden")).unwrap();
        fs::create_dir(dir.path().join("repo")).unwrap();
        fs::create_dir(dir.path().join("repo").join(".git")).unwrap();
        fs::create_dir(dir.path().join("repo").join("src")).unwrap();
        fs::create_dir(dir.path().join("plain")).unwrap();

        let entries = discover_subdirectories(dir.path(), 3);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();

        assert!(names.contains(&"repo"));
        assert!(names.contains(&"plain"));
        assert!(!names.contains(&".hidden"));
        assert!(!names.contains(&"src"), "must not descend into a repository root");
    }

    #[test]
    fn discovery_respects_max_depth() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b").join("c");
        fs::create_dir_all(&nested).unwrap();

        let entries = discover_subdirectories(dir.path(), 2);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"a"));
        assert!(names.contains(&"b"));
        assert!(!names.contains(&"c"));
    }
}
