//! Append-only download log.
//!
//! One row per successfully processed item, in page order, used for audit
//! and statistics only. Skip decisions never consult this file; the
//! already-downloaded set derives from extraction artifacts instead.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::{Layout, Source};

use super::error::StateError;

/// One committed row of the download log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRow {
    /// Stable identifier of the item.
    pub identifier: String,
    /// Remote path the item was fetched from.
    pub remote_path: String,
    /// Extracted word count; empty when no text artifact was produced.
    pub word_count: Option<u64>,
}

/// Append-only per-source download log file.
#[derive(Debug, Clone)]
pub struct DownloadLog {
    path: PathBuf,
}

impl DownloadLog {
    /// Creates a log handle for `source`.
    #[must_use]
    pub fn new(layout: &Layout, source: &Source) -> Self {
        Self {
            path: layout.download_log_file(source),
        }
    }

    /// Appends the page's successful rows, creating the file (with its
    /// header) on first use. Order within the slice is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the log cannot be appended to.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn append(&self, rows: &[LogRow]) -> Result<(), StateError> {
        if rows.is_empty() {
            return Ok(());
        }

        let new_file = !self.path.exists();
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StateError::io(&self.path, e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(new_file)
            .from_writer(file);
        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| StateError::csv(&self.path, e))?;
        }
        writer.flush().map_err(|e| StateError::io(&self.path, e))?;

        debug!(rows = rows.len(), "download log appended");
        Ok(())
    }

    /// Reads every committed row, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the log exists but cannot be parsed.
    pub fn read_all(&self) -> Result<Vec<LogRow>, StateError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|e| StateError::csv(&self.path, e))?;
        reader
            .deserialize()
            .collect::<Result<Vec<LogRow>, _>>()
            .map_err(|e| StateError::csv(&self.path, e))
    }
}
