//! Asset path helpers.

use std::path::{Component, Path, PathBuf};

use crate::error::{AssetError, Result};

/// Join a child name onto an asset path using `/`.
///
/// An empty parent (the source root) yields the bare child name.
///
/// # Examples
///
/// ```
/// use asset_extractor::util::join_asset_path;
///
/// assert_eq!(join_asset_path("python", "lib"), "python/lib");
/// assert_eq!(join_asset_path("python/", "lib"), "python/lib");
/// assert_eq!(join_asset_path("", "lib"), "lib");
/// ```
pub fn join_asset_path(parent: &str, child: &str) -> String {
    let parent = parent.trim_end_matches('/');
    if parent.is_empty() || parent == "." {
        child.to_string()
    } else {
        format!("{}/{}", parent, child)
    }
}

/// How many levels below its starting directory a relative path ends up.
///
/// `None` for absolute paths, prefixes and `..` segments that climb above the start.
pub fn relative_depth(path: &Path) -> Option<usize> {
    let mut depth: usize = 0;
    for component in path.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => depth = depth.checked_sub(1)?,
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(depth)
}

/// Whether a relative path stays inside the directory it is joined onto.
///
/// Absolute paths, prefixes and `..` segments that climb above the start are rejected.
pub fn is_relative_inside(path: &Path) -> bool {
    relative_depth(path).is_some()
}

/// Resolve an asset path below `root`, refusing anything that would land outside of it.
///
/// The empty path resolves to `root` itself.
pub fn resolve_asset_path(root: &Path, asset: &str) -> Result<PathBuf> {
    let relative = Path::new(asset);
    if !is_relative_inside(relative) {
        return Err(AssetError::InvalidPath(asset.to_string()));
    }
    Ok(root.join(relative))
}
