//! Batch outcome of copying assets.

use std::fmt;
use std::path::PathBuf;

use crate::error::AssetError;
use crate::extract::UnzipSummary;

/// Step of the extraction an asset failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolve,
    Copy,
    Unzip,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Resolve => "resolve",
            Stage::Copy => "copy",
            Stage::Unzip => "unzip",
        }
    }
}

/// One asset that did not make it to the destination intact
#[derive(Debug)]
pub struct AssetFailure {
    pub asset: String,
    pub stage: Stage,
    pub error: AssetError,
}

impl fmt::Display for AssetFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed for '{}': {}", self.stage.as_str(), self.asset, self.error)
    }
}

/// Result of a `copy_assets` run
#[derive(Debug, Default)]
pub struct CopyReport {
    /// Assets copied, with their destination paths
    pub copied: Vec<(String, PathBuf)>,
    /// Archives unpacked (and removed) after copying
    pub extracted: Vec<(String, UnzipSummary)>,
    pub bytes_copied: u64,
    pub failures: Vec<AssetFailure>,
}

impl CopyReport {
    /// True when every enumerated asset was copied and unpacked
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub(crate) fn record_failure(&mut self, asset: &str, stage: Stage, error: AssetError) {
        log::warn!("Failed to {} asset '{}': {}", stage.as_str(), asset, error);
        self.failures.push(AssetFailure {
            asset: asset.to_string(),
            stage,
            error,
        });
    }
}
