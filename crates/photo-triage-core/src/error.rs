use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the photo-triage library
#[derive(Error, Debug)]
pub enum Error {
    /// Call-level input problem (missing folder, malformed action list)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Image could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Filesystem operation failed on a specific path
    #[error("File system error on {path}: {reason}")]
    FileSystem { path: PathBuf, reason: String },

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON (de)serialisation error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-file decode failure. Recovered inside the analysis pipeline and
/// surfaced on the record instead of aborting the scan.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl DecodeError {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Read { path, .. } | Self::Corrupt { path, .. } => path,
        }
    }
}
