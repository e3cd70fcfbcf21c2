use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use super::{AssetKind, AssetSource};
use crate::error::{AssetError, Result};
use crate::util::resolve_asset_path;

/// Assets served from a directory on disk
#[derive(Debug, Clone)]
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for DirAssetSource {
    /// Children sorted by name so enumeration is stable across platforms
    fn list(&self, path: &str) -> Result<Vec<String>> {
        let dir = resolve_asset_path(&self.root, path)?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => log::warn!(
                    "Skipping non UTF-8 asset name {:?} in {}",
                    name,
                    dir.display()
                ),
            }
        }
        names.sort();

        Ok(names)
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        let file_path = resolve_asset_path(&self.root, path)?;
        if file_path.is_dir() {
            return Err(AssetError::AssetNotFound(path.to_string()));
        }

        match File::open(&file_path) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AssetError::AssetNotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn kind(&self, path: &str) -> Option<AssetKind> {
        let target = resolve_asset_path(&self.root, path).ok()?;
        let metadata = fs::metadata(target).ok()?;
        if metadata.is_dir() {
            Some(AssetKind::Directory)
        } else {
            Some(AssetKind::File)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_bundle(dir: &Path) {
        fs::create_dir_all(dir.join("python/lib")).unwrap();
        fs::create_dir_all(dir.join("empty")).unwrap();
        fs::write(dir.join("python/main.py"), "print('hi')").unwrap();
        fs::write(dir.join("python/lib/util.py"), "").unwrap();
    }

    #[test]
    fn test_list_sorted() {
        let temp = TempDir::new().unwrap();
        create_bundle(temp.path());

        let source = DirAssetSource::new(temp.path());
        assert_eq!(source.list("").unwrap(), vec!["empty", "python"]);
        assert_eq!(source.list("python").unwrap(), vec!["lib", "main.py"]);
        assert!(source.list("python/main.py").unwrap().is_empty());
        assert!(source.list("missing").unwrap().is_empty());
    }

    #[test]
    fn test_open() {
        let temp = TempDir::new().unwrap();
        create_bundle(temp.path());

        let source = DirAssetSource::new(temp.path());
        let mut contents = String::new();
        source
            .open("python/main.py")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "print('hi')");

        assert!(matches!(source.open("missing.py"), Err(AssetError::AssetNotFound(_))));
        assert!(matches!(source.open("python"), Err(AssetError::AssetNotFound(_))));
    }

    #[test]
    fn test_kind() {
        let temp = TempDir::new().unwrap();
        create_bundle(temp.path());

        let source = DirAssetSource::new(temp.path());
        assert_eq!(source.kind("python"), Some(AssetKind::Directory));
        assert_eq!(source.kind("empty"), Some(AssetKind::Directory));
        assert_eq!(source.kind("python/main.py"), Some(AssetKind::File));
        assert_eq!(source.kind("missing"), None);
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let temp = TempDir::new().unwrap();
        create_bundle(temp.path());

        let source = DirAssetSource::new(temp.path().join("python"));
        assert!(matches!(source.list(".."), Err(AssetError::InvalidPath(_))));
        assert!(matches!(source.open("../python/main.py"), Err(AssetError::InvalidPath(_))));
        assert_eq!(source.kind(".."), None);
    }
}
