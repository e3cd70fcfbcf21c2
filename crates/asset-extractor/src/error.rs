use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Archive errors
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Invalid archive {}: {source}", .path.display())]
    InvalidArchive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Unsafe entry '{entry}' in archive {}", .archive.display())]
    UnsafeEntry { archive: PathBuf, entry: String },

    // Asset source errors
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    // Path errors
    #[error("Invalid asset path: {0}")]
    InvalidPath(String),

    #[error("Path has no parent directory: {}", .0.display())]
    NoParent(PathBuf),

    // Settings errors
    #[error("Failed to parse settings: {0}")]
    SettingsParse(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AssetError>;
