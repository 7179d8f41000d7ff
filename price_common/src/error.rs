//! Error types shared between the library and the updater binary.
//!
//! The `PriceError` enum unifies the failure cases of a run (network, parsing,
//! document patching, file access and configuration) so every operation can
//! propagate a single error type up to `main`.
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Unified error type for an update run.
#[derive(Error, Debug)]
pub enum PriceError {
    /// The price request could not be sent or returned a non-success status.
    #[error("Network error: {0}")]
    Network(String),

    /// A response or history body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The document does not contain a well-formed marker pair.
    #[error("Markers not found: expected {start:?} followed by {end:?}")]
    MarkersNotFound {
        /// Start marker that was searched for.
        start: String,
        /// End marker that was searched for.
        end: String,
    },

    /// The rendered block cannot be placed between the markers.
    #[error("Invalid content: {0}")]
    InvalidContent(String),

    /// The document or history file could not be read or written.
    #[error("File error on {}: {source}", .path.display())]
    File {
        /// Path of the file being accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// Settings could not be loaded or failed validation.
    #[error("Config error: {0}")]
    Config(String),

    /// Error while parsing a coin list file into coin ids.
    #[error("Parse coins file error: {0}")]
    ParseCoinsFile(String),

    /// I/O error that is not tied to a specific file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl PriceError {
    /// Wraps an I/O failure together with the file it happened on.
    pub fn file(path: &Path, source: io::Error) -> Self {
        PriceError::File {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<config::ConfigError> for PriceError {
    fn from(err: config::ConfigError) -> Self {
        PriceError::Config(err.to_string())
    }
}
