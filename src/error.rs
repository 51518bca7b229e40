//! Error types for the fallible edges of the renderer.
//!
//! The rendering core itself never fails; only reading scene descriptions,
//! validating them and writing images can.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for renderer I/O and configuration.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Error reading or writing a file.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error reading or writing JSON.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A scene description holds a value the renderer can't use.
    #[error("invalid scene configuration: {details}")]
    InvalidConfig { details: String },
}
