//! Enumerable item outcomes and page/run counters.
//!
//! Every exit path from item processing is a value, not a caught exception:
//! the classifier produces a [`Decision`], processing produces a
//! [`ProcessingOutcome`], and [`PageCounts`] folds outcomes into the counts
//! reported per page and per run.

use std::fmt;
use std::ops::AddAssign;

use crate::extract::ExtractionOutcome;

use super::error::ItemError;

/// Classifier decision for one catalog item. First match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Not seen before, supported, not corrupt: fetch it.
    Proceed,
    /// An extraction artifact already exists for this identifier.
    SkipAlreadyDownloaded,
    /// The file-format suffix is not on the whitelist.
    SkipUnsupportedFormat,
    /// The identifier is on the corrupt-marker list.
    SkipCorrupt,
}

/// Final outcome of processing one catalog item.
#[derive(Debug)]
pub enum ProcessingOutcome {
    /// The binary was fetched; carries what extraction made of it.
    Downloaded(ExtractionOutcome),
    /// Skipped: already downloaded on a previous run (or earlier this run).
    SkippedAlreadyDownloaded,
    /// Skipped: format not on the whitelist.
    SkippedUnsupportedFormat,
    /// Skipped: known-corrupt from a previous run.
    SkippedCorrupt,
    /// The item failed in isolation; its siblings are unaffected.
    Failed(ItemError),
}

/// Outcome counts for one page, and summed per source.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageCounts {
    /// Items fetched this page whose extraction did not report corruption.
    pub downloaded: usize,
    /// Items skipped because an artifact already exists.
    pub already_downloaded: usize,
    /// Items skipped for an unsupported format.
    pub unsupported_format: usize,
    /// Items skipped as known-corrupt, plus fresh downloads found corrupt.
    pub corrupt: usize,
    /// Items that failed (download or bookkeeping error).
    pub failed: usize,
}

impl PageCounts {
    /// Folds one item's outcome into the counts.
    pub fn record(&mut self, outcome: &ProcessingOutcome) {
        match outcome {
            ProcessingOutcome::Downloaded(ExtractionOutcome::CorruptSource) => self.corrupt += 1,
            ProcessingOutcome::Downloaded(_) => self.downloaded += 1,
            ProcessingOutcome::SkippedAlreadyDownloaded => self.already_downloaded += 1,
            ProcessingOutcome::SkippedUnsupportedFormat => self.unsupported_format += 1,
            ProcessingOutcome::SkippedCorrupt => self.corrupt += 1,
            ProcessingOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Total items accounted for.
    #[must_use]
    pub fn total(&self) -> usize {
        self.downloaded
            + self.already_downloaded
            + self.unsupported_format
            + self.corrupt
            + self.failed
    }
}

impl AddAssign for PageCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.downloaded += rhs.downloaded;
        self.already_downloaded += rhs.already_downloaded;
        self.unsupported_format += rhs.unsupported_format;
        self.corrupt += rhs.corrupt;
        self.failed += rhs.failed;
    }
}

impl fmt::Display for PageCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} downloaded, {} already downloaded, {} unsupported format, {} corrupt, {} failed",
            self.downloaded,
            self.already_downloaded,
            self.unsupported_format,
            self.corrupt,
            self.failed
        )
    }
}
