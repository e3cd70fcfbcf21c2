use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use crate::error::{AssetError, Result};
use crate::source::AssetSource;

/// Copy one asset out of the source to `dst`, in `buffer_size` chunks.
///
/// Parent directories of `dst` are created first and an existing file is truncated.
/// Returns the number of bytes written. On error the destination may be missing or
/// partially written.
pub fn copy_asset_file<S: AssetSource + ?Sized>(
    source: &S,
    src: &str,
    dst: &Path,
    buffer_size: usize,
) -> Result<u64> {
    log::info!("Copying {} -> {}", src, dst.display());

    let parent = dst
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| AssetError::NoParent(dst.to_path_buf()))?;
    if !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let mut reader = source.open(src)?;
    let mut writer = File::create(dst)?;

    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut written: u64 = 0;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        writer.write_all(&buffer[..read])?;
        written += read as u64;
    }
    writer.flush()?;

    log::trace!("Copied {} bytes to {}", written, dst.display());
    Ok(written)
}
