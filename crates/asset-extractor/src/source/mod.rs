//! Read-only asset sources.
//!
//! A source is the packaged side of the extraction: it lists asset directories and opens
//! assets as byte streams. Paths are `/`-separated and relative to the source root, which is
//! addressed by the empty string.

mod dir;
mod package;

use std::io::Read;

use crate::error::Result;

pub use dir::DirAssetSource;
pub use package::{ZipAssetSource, DEFAULT_ZIP_PREFIX};

/// Kind of an entry in an asset source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    File,
    Directory,
}

/// Packaged, read-only asset storage
pub trait AssetSource {
    /// Names of the direct children of `path`. Files and missing paths list as empty.
    fn list(&self, path: &str) -> Result<Vec<String>>;

    /// Open the asset at `path` for reading
    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>>;

    /// Whether `path` is a file or a directory, if the source can tell.
    ///
    /// Sources returning `None` are enumerated by listing alone, where an empty listing
    /// means "file".
    fn kind(&self, _path: &str) -> Option<AssetKind> {
        None
    }
}

impl<T: AssetSource + ?Sized> AssetSource for &T {
    fn list(&self, path: &str) -> Result<Vec<String>> {
        (**self).list(path)
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        (**self).open(path)
    }

    fn kind(&self, path: &str) -> Option<AssetKind> {
        (**self).kind(path)
    }
}

impl<T: AssetSource + ?Sized> AssetSource for Box<T> {
    fn list(&self, path: &str) -> Result<Vec<String>> {
        (**self).list(path)
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        (**self).open(path)
    }

    fn kind(&self, path: &str) -> Option<AssetKind> {
        (**self).kind(path)
    }
}
