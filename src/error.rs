//! Error types for asset-sweep

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for asset-sweep operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("WebP encoding failed for {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("Path {path} is not under {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Invalid configuration: {reason}")]
    Configuration { reason: String },
}

/// Result type alias for asset-sweep operations
pub type Result<T> = std::result::Result<T, Error>;
