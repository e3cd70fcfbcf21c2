use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use std::sync::Mutex;

use zip::ZipArchive;

use super::{AssetKind, AssetSource};
use crate::error::{AssetError, Result};

/// Where assets live inside an application package.
pub const DEFAULT_ZIP_PREFIX: &str = "assets/";

/// Upper bound on the buffer reserved up front from an entry's declared size
const MAX_PREALLOC: usize = 1 << 20;

/// Assets read straight out of an application package (a zip container such as an APK).
///
/// Only entries under the prefix are visible. Directories are implied by entry names, so a
/// package does not need explicit directory entries.
pub struct ZipAssetSource<R: Read + Seek = BufReader<File>> {
    archive: Mutex<ZipArchive<R>>,
    prefix: String,
    /// Relative entry names in container order
    entries: Vec<String>,
    files: HashSet<String>,
    dirs: HashSet<String>,
}

impl ZipAssetSource<BufReader<File>> {
    /// Open a package file, exposing the entries under `assets/`
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_path_with_prefix(path, DEFAULT_ZIP_PREFIX)
    }

    pub fn from_path_with_prefix<P: AsRef<Path>>(path: P, prefix: &str) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let archive = ZipArchive::new(BufReader::new(file)).map_err(|e| {
            AssetError::InvalidArchive {
                path: path.to_path_buf(),
                source: e,
            }
        })?;

        log::debug!("Opened package {} ({} entries)", path.display(), archive.len());
        Ok(Self::with_archive(archive, prefix))
    }
}

impl<R: Read + Seek> ZipAssetSource<R> {
    /// Read a package from any seekable reader
    pub fn new(reader: R, prefix: &str) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self::with_archive(archive, prefix))
    }

    fn with_archive(archive: ZipArchive<R>, prefix: &str) -> Self {
        let prefix = match prefix.trim_matches('/') {
            "" => String::new(),
            p => format!("{}/", p),
        };

        let mut entries = Vec::new();
        let mut files = HashSet::new();
        let mut dirs = HashSet::new();
        dirs.insert(String::new());

        for i in 0..archive.len() {
            let Some(name) = archive.name_for_index(i) else {
                continue;
            };
            let Some(relative) = name.strip_prefix(prefix.as_str()) else {
                continue;
            };

            let is_dir = relative.ends_with('/');
            let relative = relative.trim_end_matches('/');
            if relative.is_empty() {
                continue;
            }

            // Every ancestor of an entry is a directory
            let mut end = 0;
            while let Some(pos) = relative[end..].find('/') {
                end += pos;
                dirs.insert(relative[..end].to_string());
                end += 1;
            }

            if is_dir {
                dirs.insert(relative.to_string());
            } else {
                files.insert(relative.to_string());
            }
            entries.push(relative.to_string());
        }

        Self {
            archive: Mutex::new(archive),
            prefix,
            entries,
            files,
            dirs,
        }
    }

    /// Number of visible file assets
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

impl<R: Read + Seek> AssetSource for ZipAssetSource<R> {
    fn list(&self, path: &str) -> Result<Vec<String>> {
        let path = path.trim_matches('/');
        if !self.dirs.contains(path) {
            return Ok(Vec::new());
        }

        let parent = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };

        let mut seen = HashSet::new();
        let mut children = Vec::new();
        for entry in &self.entries {
            let Some(rest) = entry.strip_prefix(parent.as_str()) else {
                continue;
            };
            let child = rest.split('/').next().unwrap_or_default();
            if !child.is_empty() && seen.insert(child) {
                children.push(child.to_string());
            }
        }

        Ok(children)
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        let path = path.trim_matches('/');
        if !self.files.contains(path) {
            return Err(AssetError::AssetNotFound(path.to_string()));
        }

        let mut archive = self
            .archive
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut entry = archive.by_name(&format!("{}{}", self.prefix, path))?;

        // The entry borrows the archive, so hand out an owned copy of its bytes
        let declared = usize::try_from(entry.size()).unwrap_or(usize::MAX);
        let mut data = Vec::with_capacity(declared.min(MAX_PREALLOC));
        entry.read_to_end(&mut data)?;

        Ok(Box::new(Cursor::new(data)))
    }

    fn kind(&self, path: &str) -> Option<AssetKind> {
        let path = path.trim_matches('/');
        if self.files.contains(path) {
            Some(AssetKind::File)
        } else if self.dirs.contains(path) {
            Some(AssetKind::Directory)
        } else {
            None
        }
    }
}
