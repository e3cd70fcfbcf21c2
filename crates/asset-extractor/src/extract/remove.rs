use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// A path that could not be removed
#[derive(Debug)]
pub struct RemoveFailure {
    pub path: PathBuf,
    pub error: io::Error,
}

/// Outcome of a recursive removal
#[derive(Debug, Default)]
pub struct RemoveReport {
    /// Removed paths, children before their parents
    pub removed: Vec<PathBuf>,
    pub failed: Vec<RemoveFailure>,
}

impl RemoveReport {
    /// True when nothing failed to delete
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Delete `root` and everything below it, children first.
///
/// Symlinks are removed, never followed. A failed deletion is recorded and the walk goes on;
/// a missing `root` gives an empty report.
pub fn remove_tree(root: &Path) -> RemoveReport {
    let mut report = RemoveReport::default();

    match fs::symlink_metadata(root) {
        Ok(metadata) if metadata.file_type().is_symlink() => {
            log::info!("Removing {}", root.display());
            match fs::remove_file(root) {
                Ok(()) => report.removed.push(root.to_path_buf()),
                Err(e) => report.failed.push(RemoveFailure {
                    path: root.to_path_buf(),
                    error: e,
                }),
            }
            return report;
        }
        Ok(_) => {}
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                report.failed.push(RemoveFailure {
                    path: root.to_path_buf(),
                    error: e,
                });
            }
            return report;
        }
    }

    for entry in WalkDir::new(root).follow_links(false).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                log::debug!("Cannot walk {}: {}", path.display(), e);
                report.failed.push(RemoveFailure {
                    path,
                    error: io::Error::from(e),
                });
                continue;
            }
        };

        let path = entry.path();
        log::info!("Removing {}", path.display());

        let result = if entry.file_type().is_dir() {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };

        match result {
            Ok(()) => report.removed.push(path.to_path_buf()),
            Err(e) => {
                log::debug!("Failed to remove {}: {}", path.display(), e);
                report.failed.push(RemoveFailure {
                    path: path.to_path_buf(),
                    error: e,
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_tree(dir: &Path) {
        fs::create_dir_all(dir.join("a/b/c")).unwrap();
        fs::write(dir.join("a/one.txt"), "1").unwrap();
        fs::write(dir.join("a/b/two.txt"), "2").unwrap();
        fs::write(dir.join("a/b/c/three.txt"), "3").unwrap();
    }

    #[test]
    fn test_remove_tree_post_order() {
        let temp = TempDir::new().unwrap();
        create_tree(temp.path());
        let root = temp.path().join("a");

        let report = remove_tree(&root);

        assert!(report.is_clean());
        assert_eq!(report.removed.len(), 6);
        assert_eq!(report.removed.last().unwrap(), &root);
        assert!(!root.exists());

        // Every directory is removed after everything inside it
        for (i, path) in report.removed.iter().enumerate() {
            for later in &report.removed[i + 1..] {
                assert!(!later.starts_with(path) || later == path);
            }
        }
    }

    #[test]
    fn test_remove_single_file() {
        let temp = TempDir::new().unwrap();
        create_tree(temp.path());
        let file = temp.path().join("a/one.txt");

        let report = remove_tree(&file);

        assert_eq!(report.removed, vec![file.clone()]);
        assert!(!file.exists());
        assert!(temp.path().join("a/b").exists());
    }

    #[test]
    fn test_remove_missing_path() {
        let temp = TempDir::new().unwrap();

        let report = remove_tree(&temp.path().join("missing"));

        assert!(report.is_clean());
        assert!(report.removed.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_remove_does_not_follow_symlinks() {
        let temp = TempDir::new().unwrap();
        create_tree(temp.path());
        let outside = temp.path().join("outside");
        fs::create_dir_all(&outside).unwrap();
        fs::write(outside.join("keep.txt"), "keep").unwrap();
        std::os::unix::fs::symlink(&outside, temp.path().join("a/link")).unwrap();

        let report = remove_tree(&temp.path().join("a"));

        assert!(report.is_clean());
        assert!(!temp.path().join("a").exists());
        assert!(outside.join("keep.txt").exists());
    }
}
