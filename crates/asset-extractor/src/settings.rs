//! Key-value settings storage for the extracted assets version.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{AssetError, Result};

/// Settings key the extracted assets version is stored under.
pub const ASSETS_VERSION_KEY: &str = "assetsVersion";

/// Process-wide integer settings, injected into the extractor.
pub trait SettingsStore {
    /// Read an integer, falling back to `default` when the key is absent or unreadable
    fn get_int(&self, key: &str, default: i32) -> i32;

    /// Persist an integer under `key`
    fn put_int(&self, key: &str, value: i32) -> Result<()>;
}

impl<T: SettingsStore + ?Sized> SettingsStore for &T {
    fn get_int(&self, key: &str, default: i32) -> i32 {
        (**self).get_int(key, default)
    }

    fn put_int(&self, key: &str, value: i32) -> Result<()> {
        (**self).put_int(key, value)
    }
}

/// In-memory settings
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, i32>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get_int(&self, key: &str, default: i32) -> i32 {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .copied()
            .unwrap_or(default)
    }

    fn put_int(&self, key: &str, value: i32) -> Result<()> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value);
        Ok(())
    }
}

/// Settings kept in a JSON object file.
///
/// Nothing is cached: every read goes back to the file, and every write replaces the
/// file atomically so a crash never leaves half a document behind.
#[derive(Debug, Clone)]
pub struct JsonFileSettings {
    path: PathBuf,
}

impl JsonFileSettings {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str(&contents)? {
            Value::Object(map) => Ok(map),
            other => Err(AssetError::Settings(format!(
                "Expected a JSON object in {}, found {}",
                self.path.display(),
                other
            ))),
        }
    }

    fn store(&self, map: &Map<String, Value>) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut temp, map)?;
        temp.flush()?;
        temp.persist(&self.path).map_err(|e| AssetError::Io(e.error))?;
        Ok(())
    }
}

impl SettingsStore for JsonFileSettings {
    fn get_int(&self, key: &str, default: i32) -> i32 {
        let map = match self.load() {
            Ok(map) => map,
            Err(e) => {
                log::warn!("Failed to read settings from {}: {}", self.path.display(), e);
                return default;
            }
        };

        match map.get(key) {
            Some(value) => match value.as_i64().and_then(|v| i32::try_from(v).ok()) {
                Some(v) => v,
                None => {
                    log::warn!("Setting '{}' is not a 32-bit integer: {}", key, value);
                    default
                }
            },
            None => default,
        }
    }

    fn put_int(&self, key: &str, value: i32) -> Result<()> {
        let mut map = self.load()?;
        map.insert(key.to_string(), Value::from(value));
        self.store(&map)?;

        log::debug!("Stored {}={} in {}", key, value, self.path.display());
        Ok(())
    }
}
