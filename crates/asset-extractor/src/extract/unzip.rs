//! In-place decompression of zip assets.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use crate::config::EntryPathPolicy;
use crate::error::{AssetError, Result};

/// What an archive produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnzipSummary {
    /// Directory the entries were written into
    pub root: PathBuf,
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
    /// Entries skipped because their names escape the root
    pub skipped: Vec<String>,
}

/// Whether an asset path names a zip archive (lowercase `.zip` suffix only)
pub fn is_zip_asset(path: &str) -> bool {
    path.ends_with(".zip")
}

/// Unpack `archive_path` into its own directory, then delete the archive.
///
/// Entries are processed in container order. Each entry's parent directories are created
/// whether or not the archive lists them. Any failure stops the extraction and is returned;
/// entries written so far and the archive itself stay on disk.
pub fn unzip_asset(
    archive_path: &Path,
    policy: EntryPathPolicy,
    buffer_size: usize,
) -> Result<UnzipSummary> {
    log::debug!("Extracting: {}", archive_path.display());

    let root = archive_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| AssetError::NoParent(archive_path.to_path_buf()))?
        .to_path_buf();

    let mut summary = extract_entries(archive_path, &root, policy, buffer_size)?;
    summary.root = root;

    // The archive handle is closed by now
    fs::remove_file(archive_path)?;
    log::debug!(
        "Extracted {} files from {}, archive removed",
        summary.files,
        archive_path.display()
    );

    Ok(summary)
}

fn extract_entries(
    archive_path: &Path,
    root: &Path,
    policy: EntryPathPolicy,
    buffer_size: usize,
) -> Result<UnzipSummary> {
    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| {
        AssetError::InvalidArchive {
            path: archive_path.to_path_buf(),
            source: e,
        }
    })?;

    let mut summary = UnzipSummary::default();
    let mut buffer = vec![0u8; buffer_size.max(1)];

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();

        let relative = match entry.enclosed_name() {
            Some(path) => path,
            None => match policy {
                EntryPathPolicy::Reject => {
                    return Err(AssetError::UnsafeEntry {
                        archive: archive_path.to_path_buf(),
                        entry: name,
                    });
                }
                EntryPathPolicy::Skip => {
                    log::warn!(
                        "Skipping unsafe entry '{}' in {}",
                        name,
                        archive_path.display()
                    );
                    summary.skipped.push(name);
                    continue;
                }
            },
        };

        let dest = root.join(&relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        if entry.is_dir() {
            fs::create_dir_all(&dest)?;
            summary.directories += 1;
            continue;
        }

        log::trace!("Extracting entry {} -> {}", name, dest.display());
        let mut writer = BufWriter::with_capacity(buffer.len(), File::create(&dest)?);
        loop {
            let read = match entry.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            writer.write_all(&buffer[..read])?;
            summary.bytes += read as u64;
        }
        writer.flush()?;
        drop(writer);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // rwx bits only, always owner-writable
            if let Some(mode) = entry.unix_mode().filter(|m| m & 0o777 != 0) {
                fs::set_permissions(&dest, fs::Permissions::from_mode((mode & 0o777) | 0o200))?;
            }
        }

        summary.files += 1;
    }

    Ok(summary)
}
