use crate::source::{AssetKind, AssetSource};
use crate::util::join_asset_path;

/// Recursively list every leaf asset under `path`.
///
/// Results follow the source's listing order. When the source can tell files from
/// directories, empty directories contribute nothing. Otherwise an empty listing is taken to
/// mean "file", so an empty directory comes back as a leaf.
///
/// A listing error is logged and treated as "no children".
pub fn list_assets<S: AssetSource + ?Sized>(source: &S, path: &str) -> Vec<String> {
    let mut assets = Vec::new();
    collect_assets(source, path, &mut assets);
    assets
}

fn collect_assets<S: AssetSource + ?Sized>(source: &S, path: &str, assets: &mut Vec<String>) {
    let kind = source.kind(path);
    if kind == Some(AssetKind::File) {
        assets.push(path.to_string());
        return;
    }

    let children = match source.list(path) {
        Ok(children) => children,
        Err(e) => {
            log::warn!("Failed to list assets in '{}': {}", path, e);
            Vec::new()
        }
    };

    if children.is_empty() {
        if kind.is_none() {
            assets.push(path.to_string());
        } else {
            log::trace!("Skipping empty asset directory '{}'", path);
        }
        return;
    }

    for child in children {
        collect_assets(source, &join_asset_path(path, &child), assets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AssetError, Result};
    use crate::source::DirAssetSource;
    use std::fs;
    use std::io::Read;
    use std::path::Path;
    use tempfile::TempDir;

    /// Forwards to a directory source but cannot tell files from directories
    struct ListingOnly(DirAssetSource);

    impl AssetSource for ListingOnly {
        fn list(&self, path: &str) -> Result<Vec<String>> {
            self.0.list(path)
        }

        fn open(&self, path: &str) -> Result<Box<dyn Read + '_>> {
            self.0.open(path)
        }
    }

    struct BrokenListing;

    impl AssetSource for BrokenListing {
        fn list(&self, _path: &str) -> Result<Vec<String>> {
            Err(AssetError::Io(std::io::Error::other("listing failed")))
        }

        fn open(&self, path: &str) -> Result<Box<dyn Read + '_>> {
            Err(AssetError::AssetNotFound(path.to_string()))
        }
    }

    fn create_bundle(dir: &Path) {
        fs::create_dir_all(dir.join("python/lib")).unwrap();
        fs::create_dir_all(dir.join("python/empty")).unwrap();
        fs::write(dir.join("python/main.py"), "").unwrap();
        fs::write(dir.join("python/lib/util.py"), "").unwrap();
        fs::write(dir.join("python/lib/zz.py"), "").unwrap();
    }

    #[test]
    fn test_list_assets_recurses() {
        let temp = TempDir::new().unwrap();
        create_bundle(temp.path());

        let source = DirAssetSource::new(temp.path());
        assert_eq!(
            list_assets(&source, "python"),
            vec!["python/lib/util.py", "python/lib/zz.py", "python/main.py"]
        );
    }

    #[test]
    fn test_list_assets_single_file() {
        let temp = TempDir::new().unwrap();
        create_bundle(temp.path());

        let source = DirAssetSource::new(temp.path());
        assert_eq!(list_assets(&source, "python/main.py"), vec!["python/main.py"]);
    }

    #[test]
    fn test_list_assets_from_root() {
        let temp = TempDir::new().unwrap();
        create_bundle(temp.path());

        let source = DirAssetSource::new(temp.path().join("python"));
        assert_eq!(
            list_assets(&source, ""),
            vec!["lib/util.py", "lib/zz.py", "main.py"]
        );
    }

    #[test]
    fn test_empty_directory_is_leaf_without_kind() {
        let temp = TempDir::new().unwrap();
        create_bundle(temp.path());

        let source = ListingOnly(DirAssetSource::new(temp.path()));
        assert_eq!(
            list_assets(&source, "python"),
            vec![
                "python/empty",
                "python/lib/util.py",
                "python/lib/zz.py",
                "python/main.py"
            ]
        );
    }

    #[test]
    fn test_listing_error_degrades_to_leaf() {
        assert_eq!(list_assets(&BrokenListing, "python"), vec!["python"]);
    }
}
