//! Text-extraction boundary.
//!
//! The pipeline does not implement text extraction; it routes downloaded
//! files to a [`TextExtractor`] collaborator through the
//! [`ExtractionDispatcher`] and reacts to the [`ExtractionOutcome`]:
//! `CorruptSource` feeds the corrupt-marker store, `Unsupported` and
//! `EmptyText` are counted but never escalated, `Written` counts as a page
//! success. One extraction is in flight at a time; the extractor may hold a
//! heavyweight resource across calls and is asked to re-initialize after a
//! corrupt source.

mod dispatcher;
mod docx;

pub use dispatcher::{DispatchError, ExtractionDispatcher};
pub use docx::DocxExtractor;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Result of dispatching one downloaded file to the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// A text artifact was written; carries the extracted word count.
    Written(u64),
    /// The document opened but contained no text; no artifact written.
    EmptyText,
    /// The extractor does not handle this format; a no-op, not an error.
    Unsupported,
    /// The document could not be opened; the item is marked corrupt and
    /// permanently skipped on future runs.
    CorruptSource,
}

/// Errors a [`TextExtractor`] implementation can report.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The document's content could not be decoded.
    #[error("corrupt document {path}: {reason}")]
    Corrupt {
        /// The document that failed to open.
        path: PathBuf,
        /// What went wrong, extractor-specific.
        reason: String,
    },

    /// The document file itself could not be read.
    #[error("IO error reading document {path}: {source}")]
    Io {
        /// The document path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    /// Creates a corrupt-document error.
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.into(),
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

/// A format-specific plain-text extractor.
///
/// Object-safe so the dispatcher can hold `Box<dyn TextExtractor>`; the
/// shipped implementation is [`DocxExtractor`].
#[async_trait]
pub trait TextExtractor: Send {
    /// True when this extractor can decode documents with the given
    /// (lowercase) format suffix.
    fn handles(&self, suffix: &str) -> bool;

    /// Extracts the document's plain text.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError`] when the document cannot be read or
    /// decoded. The dispatcher treats any extraction error as a corrupt
    /// source and calls [`reset`](Self::reset) before the next document.
    async fn extract(&mut self, path: &Path) -> Result<String, ExtractError>;

    /// Re-initializes any shared heavyweight resource after a corrupt
    /// source. The default is a no-op for stateless extractors.
    async fn reset(&mut self) {}
}
