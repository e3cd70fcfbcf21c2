//! Extraction of bundled application assets onto writable storage.
//!
//! Assets are read from an [`AssetSource`] (a directory standing in for the package, or the
//! application package itself as a zip container) and mirrored under `<data_dir>/assets/`.
//! Nested `.zip` assets are unpacked in place and the archive removed afterwards. A version
//! number kept in a [`SettingsStore`] tells the host application when the assets must be
//! extracted again.
//!
//! # Example
//!
//! ```rust,no_run
//! use asset_extractor::{AssetExtractor, DirAssetSource, ExtractorConfig, JsonFileSettings};
//!
//! let source = DirAssetSource::new("/opt/app/bundle");
//! let settings = JsonFileSettings::new("/var/lib/app/settings.json");
//! let extractor = AssetExtractor::new(source, settings, ExtractorConfig::new("/var/lib/app"));
//!
//! if let Some(report) = extractor.sync_assets("python", 3).unwrap() {
//!     for failure in &report.failures {
//!         eprintln!("{}", failure);
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod extractor;
pub mod report;
pub mod settings;
pub mod source;
pub mod util;

pub use config::{ConfigLoader, EntryPathPolicy, ExtractorConfig, FailurePolicy};
pub use error::{AssetError, Result};
pub use extract::{RemoveReport, UnzipSummary};
pub use extractor::AssetExtractor;
pub use report::{AssetFailure, CopyReport, Stage};
pub use settings::{JsonFileSettings, MemorySettings, SettingsStore, ASSETS_VERSION_KEY};
pub use source::{AssetKind, AssetSource, DirAssetSource, ZipAssetSource};
