//! Extraction building blocks: enumerate, copy, unzip and remove.
//!
//! These work on plain sources and paths. [`crate::AssetExtractor`] ties them to a
//! destination root, a configuration and a settings store.

mod copy;
mod enumerate;
mod remove;
mod unzip;

pub use copy::copy_asset_file;
pub use enumerate::list_assets;
pub use remove::{remove_tree, RemoveFailure, RemoveReport};
pub use unzip::{is_zip_asset, unzip_asset, UnzipSummary};
