//! Per-item error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::extract::DispatchError;

/// Errors that fail one item without aborting its page.
///
/// The orchestrator converts every variant into a
/// [`ProcessingOutcome::Failed`](super::ProcessingOutcome::Failed); it is
/// counted and logged, and the loop continues with the next item.
#[derive(Debug, Error)]
pub enum ItemError {
    /// The catalog entry carries no usable remote-path field.
    #[error("catalog entry has no file path")]
    MissingFilePath,

    /// Network-level error fetching the item's binary.
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The remote path that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The item's remote path returned a non-200 status.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The remote path that was refused.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error persisting the item's binary.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The local path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The extraction dispatcher failed to persist a text artifact.
    #[error(transparent)]
    Extraction(#[from] DispatchError),
}

impl ItemError {
    /// Creates a network error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
