//! The asset extractor: enumerate, copy, unzip, remove and version tracking on top of an
//! injected asset source and settings store.

use std::path::{Path, PathBuf};

use crate::config::{ExtractorConfig, FailurePolicy};
use crate::error::{AssetError, Result};
use crate::extract::{self, is_zip_asset, RemoveReport, UnzipSummary};
use crate::report::{CopyReport, Stage};
use crate::settings::{SettingsStore, ASSETS_VERSION_KEY};
use crate::source::AssetSource;
use crate::util::resolve_asset_path;

/// Extracts assets from `S` into `<data_dir>/assets/`, tracking the extracted version in `K`
pub struct AssetExtractor<S, K> {
    source: S,
    settings: K,
    config: ExtractorConfig,
}

impl<S: AssetSource, K: SettingsStore> AssetExtractor<S, K> {
    pub fn new(source: S, settings: K, config: ExtractorConfig) -> Self {
        Self {
            source,
            settings,
            config,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn settings(&self) -> &K {
        &self.settings
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Store the version of the extracted assets
    pub fn set_assets_version(&self, version: i32) -> Result<()> {
        log::debug!("Setting assets version to {}", version);
        self.settings.put_int(ASSETS_VERSION_KEY, version)
    }

    /// Version of the extracted assets, 0 if never set
    pub fn get_assets_version(&self) -> i32 {
        self.settings.get_int(ASSETS_VERSION_KEY, 0)
    }

    /// Directory the assets are extracted into
    pub fn assets_data_dir(&self) -> PathBuf {
        self.config.assets_data_dir()
    }

    /// Every leaf asset under `path` in the source
    pub fn list_assets(&self, path: &str) -> Vec<String> {
        extract::list_assets(&self.source, path)
    }

    /// Copy every asset under `path` into the assets data dir, unpacking `.zip` assets.
    ///
    /// With [`FailurePolicy::Continue`] failures are collected in the report and the run
    /// carries on; with [`FailurePolicy::FailFast`] the first failure is returned.
    pub fn copy_assets(&self, path: &str) -> Result<CopyReport> {
        self.config.validate()?;

        let root = self.assets_data_dir();
        let assets = self.list_assets(path);
        log::info!(
            "Copying {} assets from '{}' into {}",
            assets.len(),
            path,
            root.display()
        );

        let mut report = CopyReport::default();
        for asset in &assets {
            if let Err((stage, error)) = self.copy_one(asset, &root, &mut report) {
                match self.config.failure_policy {
                    FailurePolicy::Continue => report.record_failure(asset, stage, error),
                    FailurePolicy::FailFast => {
                        log::warn!("Failed to {} asset '{}': {}", stage.as_str(), asset, error);
                        return Err(error);
                    }
                }
            }
        }

        log::info!(
            "Copied {} assets ({} bytes), {} archives extracted, {} failures",
            report.copied.len(),
            report.bytes_copied,
            report.extracted.len(),
            report.failures.len()
        );
        Ok(report)
    }

    fn copy_one(
        &self,
        asset: &str,
        root: &Path,
        report: &mut CopyReport,
    ) -> std::result::Result<(), (Stage, AssetError)> {
        let dst = resolve_asset_path(root, asset).map_err(|e| (Stage::Resolve, e))?;

        let bytes =
            extract::copy_asset_file(&self.source, asset, &dst, self.config.copy_buffer_size)
                .map_err(|e| (Stage::Copy, e))?;
        report.bytes_copied += bytes;
        report.copied.push((asset.to_string(), dst.clone()));

        if self.config.unzip_archives && is_zip_asset(asset) {
            let summary = self.unzip_asset(&dst).map_err(|e| (Stage::Unzip, e))?;
            report.extracted.push((asset.to_string(), summary));
        }

        Ok(())
    }

    /// Unpack an extracted archive next to itself and delete it
    pub fn unzip_asset(&self, archive: &Path) -> Result<UnzipSummary> {
        extract::unzip_asset(
            archive,
            self.config.entry_path_policy,
            self.config.unzip_buffer_size,
        )
    }

    /// Recursively delete `<assets_data_dir>/<path>`.
    ///
    /// Deletion failures are reported, not raised. An invalid config or a path escaping
    /// the assets directory is an error, and nothing is touched.
    pub fn remove_assets(&self, path: &str) -> Result<RemoveReport> {
        self.config.validate()?;

        let target = resolve_asset_path(&self.assets_data_dir(), path)?;
        let report = extract::remove_tree(&target);

        if !report.is_clean() {
            log::warn!(
                "{} paths under {} could not be removed",
                report.failed.len(),
                target.display()
            );
        }
        Ok(report)
    }

    /// Whether `<assets_data_dir>/<path>` exists, false for an invalid config
    pub fn exists_assets(&self, path: &str) -> bool {
        if self.config.validate().is_err() {
            return false;
        }
        match resolve_asset_path(&self.assets_data_dir(), path) {
            Ok(target) => target.exists(),
            Err(_) => false,
        }
    }

    /// Re-extract `path` when the stored version differs from `version`.
    ///
    /// Returns `None` when the assets are already current. The new version is stored only
    /// when the old tree was fully removed and every asset was copied, so an interrupted
    /// extraction is retried next time.
    pub fn sync_assets(&self, path: &str, version: i32) -> Result<Option<CopyReport>> {
        self.config.validate()?;

        let current = self.get_assets_version();
        if current == version {
            log::debug!("Assets are up to date (version {})", version);
            return Ok(None);
        }

        log::info!(
            "Assets version changed ({} -> {}), extracting '{}'",
            current,
            version,
            path
        );

        let removal = self.remove_assets(path)?;
        let report = self.copy_assets(path)?;

        if sync_succeeded(&removal, &report) {
            self.set_assets_version(version)?;
        } else {
            log::warn!(
                "Keeping assets version {}: {} stale paths left, {} assets failed",
                current,
                removal.failed.len(),
                report.failures.len()
            );
        }

        Ok(Some(report))
    }
}

/// Whether a sync left exactly the new assets on disk
fn sync_succeeded(removal: &RemoveReport, report: &CopyReport) -> bool {
    removal.is_clean() && report.is_complete()
}
