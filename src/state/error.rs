//! Error types for persisted state operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by cursor, ledger, log, and lock operations.
#[derive(Debug, Error)]
pub enum StateError {
    /// File system error reading or writing a state file.
    #[error("IO error on state file {path}: {source}")]
    Io {
        /// The state file involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A tabular state file could not be read or written.
    #[error("CSV error on {path}: {source}")]
    Csv {
        /// The tabular file involved.
        path: PathBuf,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Another run already holds this source's lock.
    #[error("source is locked by another run (lock file {path})")]
    SourceLocked {
        /// The contended lock file.
        path: PathBuf,
    },
}

impl StateError {
    /// Creates an IO error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a CSV error for `path`.
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
