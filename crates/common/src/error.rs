//! Error types shared across Icetrack crates.

use std::path::PathBuf;

/// Top-level error type for Icetrack operations.
#[derive(Debug, thiserror::Error)]
pub enum IcetrackError {
    #[error("Track data error: {message}")]
    Data { message: String },

    #[error("Geo error: {message}")]
    Geo { message: String },

    #[error("Raster error: {message}")]
    Raster { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using IcetrackError.
pub type IcetrackResult<T> = Result<T, IcetrackError>;

impl IcetrackError {
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data {
            message: msg.into(),
        }
    }

    pub fn geo(msg: impl Into<String>) -> Self {
        Self::Geo {
            message: msg.into(),
        }
    }

    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }
}
