//! Extractor configuration.
//!
//! Values are resolved in this order (highest priority first):
//!
//! 1. Environment variables (`ASSET_EXTRACTOR_*`), when the loader has them enabled
//! 2. A JSON configuration file
//! 3. Built-in defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use asset_extractor::config::{ConfigLoader, ExtractorConfig};
//!
//! let loader = ConfigLoader::new(true);
//! let config = loader.build(Some("/etc/app/extractor.json")).unwrap();
//! println!("Assets dir: {:?}", config.assets_data_dir());
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AssetError, Result};

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "ASSET_EXTRACTOR_";

/// Chunk size used when copying assets out of the source.
pub const DEFAULT_COPY_BUFFER_SIZE: usize = 1024;

/// Buffer size used when writing decompressed archive entries.
pub const DEFAULT_UNZIP_BUFFER_SIZE: usize = 8192;

/// What a batch operation does when a single asset fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Log the failure, record it in the report and move on to the next asset
    Continue,
    /// Stop at the first failure and return it
    FailFast,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::Continue
    }
}

impl FailurePolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "continue" => Some(FailurePolicy::Continue),
            "fail-fast" | "failfast" => Some(FailurePolicy::FailFast),
            _ => None,
        }
    }
}

/// How archive entries whose names escape the extraction root are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryPathPolicy {
    /// Abort extraction of the archive
    Reject,
    /// Log and skip the entry
    Skip,
}

impl Default for EntryPathPolicy {
    fn default() -> Self {
        EntryPathPolicy::Reject
    }
}

impl EntryPathPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "reject" => Some(EntryPathPolicy::Reject),
            "skip" => Some(EntryPathPolicy::Skip),
            _ => None,
        }
    }
}

/// Extractor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExtractorConfig {
    /// Application data directory; assets land in `<data_dir>/<assets_dir>/`
    pub data_dir: PathBuf,
    pub assets_dir: String,
    pub copy_buffer_size: usize,
    pub unzip_buffer_size: usize,
    pub failure_policy: FailurePolicy,
    pub entry_path_policy: EntryPathPolicy,
    /// Unpack `.zip` assets after copying them
    pub unzip_archives: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            assets_dir: "assets".to_string(),
            copy_buffer_size: DEFAULT_COPY_BUFFER_SIZE,
            unzip_buffer_size: DEFAULT_UNZIP_BUFFER_SIZE,
            failure_policy: FailurePolicy::default(),
            entry_path_policy: EntryPathPolicy::default(),
            unzip_archives: true,
        }
    }
}

impl ExtractorConfig {
    /// Create a configuration rooted at the given application data directory
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Create a configuration rooted at the platform data directory for `app_name`
    pub fn for_app(app_name: &str) -> Option<Self> {
        directories::ProjectDirs::from("", "", app_name).map(|dirs| Self::new(dirs.data_dir()))
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_entry_path_policy(mut self, policy: EntryPathPolicy) -> Self {
        self.entry_path_policy = policy;
        self
    }

    pub fn with_assets_dir(mut self, assets_dir: impl Into<String>) -> Self {
        self.assets_dir = assets_dir.into();
        self
    }

    pub fn with_unzip_archives(mut self, unzip: bool) -> Self {
        self.unzip_archives = unzip;
        self
    }

    /// Directory all extracted assets are mirrored into
    pub fn assets_data_dir(&self) -> PathBuf {
        self.data_dir.join(&self.assets_dir)
    }

    /// Check values that would make extraction impossible
    pub fn validate(&self) -> Result<()> {
        if self.copy_buffer_size == 0 {
            return Err(AssetError::Config("copy-buffer-size must be greater than 0".to_string()));
        }
        if self.unzip_buffer_size == 0 {
            return Err(AssetError::Config("unzip-buffer-size must be greater than 0".to_string()));
        }
        // Must resolve strictly below data_dir
        let depth = crate::util::relative_depth(Path::new(&self.assets_dir));
        if !matches!(depth, Some(d) if d > 0) {
            return Err(AssetError::Config(format!(
                "assets-dir must be a relative directory name, got '{}'",
                self.assets_dir
            )));
        }
        Ok(())
    }
}

/// Loads extractor configuration from files and the environment
#[derive(Debug)]
pub struct ConfigLoader {
    use_environment: bool,
}

impl ConfigLoader {
    pub fn new(use_environment: bool) -> Self {
        Self { use_environment }
    }

    /// Get an environment variable, ignoring empty values
    pub fn get_env(&self, var: &str) -> Option<String> {
        if !self.use_environment {
            return None;
        }

        env::var(var).ok().filter(|s| !s.is_empty())
    }

    /// Get a configuration value from the environment.
    /// Converts "copy-buffer-size" to "ASSET_EXTRACTOR_COPY_BUFFER_SIZE"
    pub fn get_env_config(&self, key: &str) -> Option<String> {
        let var = format!("{}{}", ENV_PREFIX, key.replace('-', "_").to_uppercase());
        self.get_env(&var)
    }

    pub fn get_env_bool(&self, key: &str) -> Option<bool> {
        self.get_env_config(key)
            .map(|val| !matches!(val.to_lowercase().as_str(), "false" | "0" | "no"))
    }

    pub fn get_env_usize(&self, key: &str) -> Option<usize> {
        self.get_env_config(key).and_then(|val| val.parse().ok())
    }

    /// Load configuration from a JSON file. A missing file yields the defaults.
    pub fn load_config_file<P: AsRef<Path>>(&self, path: P) -> Result<ExtractorConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(ExtractorConfig::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| AssetError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| AssetError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Apply `ASSET_EXTRACTOR_*` overrides on top of `config`
    pub fn apply_env_overrides(&self, config: &mut ExtractorConfig) {
        if let Some(dir) = self.get_env_config("data-dir") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = self.get_env_config("assets-dir") {
            config.assets_dir = dir;
        }
        if let Some(size) = self.get_env_usize("copy-buffer-size") {
            config.copy_buffer_size = size;
        }
        if let Some(size) = self.get_env_usize("unzip-buffer-size") {
            config.unzip_buffer_size = size;
        }
        if let Some(unzip) = self.get_env_bool("unzip-archives") {
            config.unzip_archives = unzip;
        }
        if let Some(val) = self.get_env_config("failure-policy") {
            match FailurePolicy::from_str(&val) {
                Some(policy) => config.failure_policy = policy,
                None => log::warn!("Ignoring unknown failure policy '{}'", val),
            }
        }
        if let Some(val) = self.get_env_config("entry-path-policy") {
            match EntryPathPolicy::from_str(&val) {
                Some(policy) => config.entry_path_policy = policy,
                None => log::warn!("Ignoring unknown entry path policy '{}'", val),
            }
        }
    }

    /// Build the final configuration: defaults, then the optional file, then the environment
    pub fn build<P: AsRef<Path>>(&self, config_file: Option<P>) -> Result<ExtractorConfig> {
        let mut config = match config_file {
            Some(path) => self.load_config_file(path)?,
            None => ExtractorConfig::default(),
        };

        self.apply_env_overrides(&mut config);
        config.validate()?;

        log::debug!("Extractor config: {:?}", config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ExtractorConfig::default();

        assert_eq!(config.assets_dir, "assets");
        assert_eq!(config.copy_buffer_size, 1024);
        assert_eq!(config.unzip_buffer_size, 8192);
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
        assert_eq!(config.entry_path_policy, EntryPathPolicy::Reject);
        assert!(config.unzip_archives);
    }

    #[test]
    fn test_assets_data_dir() {
        let config = ExtractorConfig::new("/data/app");
        assert_eq!(config.assets_data_dir(), PathBuf::from("/data/app/assets"));

        let config = config.with_assets_dir("bundle");
        assert_eq!(config.assets_data_dir(), PathBuf::from("/data/app/bundle"));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(FailurePolicy::from_str("continue"), Some(FailurePolicy::Continue));
        assert_eq!(FailurePolicy::from_str("Fail-Fast"), Some(FailurePolicy::FailFast));
        assert_eq!(FailurePolicy::from_str("retry"), None);

        assert_eq!(EntryPathPolicy::from_str("skip"), Some(EntryPathPolicy::Skip));
        assert_eq!(EntryPathPolicy::from_str("REJECT"), Some(EntryPathPolicy::Reject));
        assert_eq!(EntryPathPolicy::from_str("preserve"), None);
    }

    #[test]
    fn test_validate() {
        assert!(ExtractorConfig::default().validate().is_ok());

        let mut config = ExtractorConfig::default();
        config.copy_buffer_size = 0;
        assert!(matches!(config.validate(), Err(AssetError::Config(_))));

        let config = ExtractorConfig::default().with_assets_dir("../outside");
        assert!(config.validate().is_err());

        let config = ExtractorConfig::default().with_assets_dir("");
        assert!(config.validate().is_err());

        for dir in [".", "a/..", "/"] {
            let config = ExtractorConfig::default().with_assets_dir(dir);
            assert!(config.validate().is_err(), "{} should be rejected", dir);
        }
        assert!(ExtractorConfig::default().with_assets_dir("a/../b").validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigLoader::new(false);

        let config = loader.load_config_file(temp.path().join("missing.json")).unwrap();
        assert_eq!(config, ExtractorConfig::default());
    }

    #[test]
    fn test_load_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("extractor.json");
        fs::write(
            &path,
            r#"{
                "data-dir": "/data/app",
                "copy-buffer-size": 4096,
                "failure-policy": "fail-fast"
            }"#,
        )
        .unwrap();

        let loader = ConfigLoader::new(false);
        let config = loader.build(Some(&path)).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/data/app"));
        assert_eq!(config.copy_buffer_size, 4096);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        // Untouched keys keep their defaults
        assert_eq!(config.unzip_buffer_size, 8192);
        assert_eq!(config.assets_dir, "assets");
    }

    #[test]
    fn test_load_invalid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("extractor.json");
        fs::write(&path, "not json").unwrap();

        let loader = ConfigLoader::new(false);
        assert!(matches!(loader.load_config_file(&path), Err(AssetError::Config(_))));
    }

    #[test]
    fn test_env_disabled() {
        let loader = ConfigLoader::new(false);
        assert_eq!(loader.get_env("PATH"), None);
        assert_eq!(loader.get_env_config("data-dir"), None);
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("ASSET_EXTRACTOR_UNZIP_BUFFER_SIZE", "16384");
        env::set_var("ASSET_EXTRACTOR_UNZIP_ARCHIVES", "false");
        env::set_var("ASSET_EXTRACTOR_ENTRY_PATH_POLICY", "skip");

        let loader = ConfigLoader::new(true);
        let mut config = ExtractorConfig::default();
        loader.apply_env_overrides(&mut config);

        assert_eq!(config.unzip_buffer_size, 16384);
        assert!(!config.unzip_archives);
        assert_eq!(config.entry_path_policy, EntryPathPolicy::Skip);

        env::remove_var("ASSET_EXTRACTOR_UNZIP_BUFFER_SIZE");
        env::remove_var("ASSET_EXTRACTOR_UNZIP_ARCHIVES");
        env::remove_var("ASSET_EXTRACTOR_ENTRY_PATH_POLICY");
    }
}
