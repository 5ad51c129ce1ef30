//! Longest-prefix-wins ownership tie-break for overlapping registered
//! sources (§4.3).

use std::path::Path;

/// Given the set of all registered source roots and a candidate file path,
/// returns the root that owns the file: the registered root whose path is
/// the longest prefix of the file's path. Returns `None` if no root owns it
/// (the file is outside every registered root — should not happen for a
/// path produced by walking a specific source, but callers may use this to
/// defend against stale overlap state).
pub fn owning_root<'a>(roots: &'a [&'a Path], file_path: &Path) -> Option<&'a Path> {
    roots
        .iter()
        .filter(|root| file_path.starts_with(root))
        .max_by_key(|root| root.as_os_str().len())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn most_specific_root_wins() {
        let a = PathBuf::from("/repo");
        let b = PathBuf::from("/repo/vendor");
        let roots = [a.as_path(), b.as_path()];
        let file = PathBuf::from("/repo/vendor/lib.rs");

        assert_eq!(owning_root(&roots, &file), Some(b.as_path()));
    }

    #[test]
    fn falls_back_to_only_matching_root() {
        let a = PathBuf::from("/repo");
        let roots = [a.as_path()];
        let file = PathBuf::from("/repo/src/main.rs");
        assert_eq!(owning_root(&roots, &file), Some(a.as_path()));
    }

    #[test]
    fn returns_none_when_no_root_contains_the_path() {
        let a = PathBuf::from("/repo");
        let roots = [a.as_path()];
        let file = PathBuf::from("/elsewhere/main.rs");
        assert_eq!(owning_root(&roots, &file), None);
    }
}
