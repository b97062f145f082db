//! Download ledger: what has already been fetched, what is known-corrupt.
//!
//! The already-downloaded set is not stored anywhere; it is derived once per
//! run by listing the source's extracted-text artifacts and stripping the
//! `.txt` artifact extension, which recovers the item's stable identifier.
//! Any filename match counts, whatever the artifact's size.
//!
//! Corrupt markers are a separate append-only CSV: once an identifier is
//! marked, it is permanently skipped on future runs unless the row is
//! removed by hand.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::{Layout, Source};

use super::error::StateError;

/// Artifact extension appended by the extraction dispatcher.
const ARTIFACT_SUFFIX: &str = ".txt";

#[derive(Debug, Serialize, Deserialize)]
struct CorruptRow {
    identifier: String,
}

/// Per-source skip bookkeeping, loaded once per run.
#[derive(Debug)]
pub struct DownloadLedger {
    already: HashSet<String>,
    corrupt: HashSet<String>,
    pending_corrupt: Vec<String>,
    corrupt_file: PathBuf,
}

impl DownloadLedger {
    /// Builds the ledger for `source`: lists its extracted-text artifacts
    /// and loads its corrupt-marker file.
    ///
    /// A missing texts directory or marker file yields an empty set, not an
    /// error; both appear on the first run.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if an existing directory or marker file cannot
    /// be read.
    #[instrument(skip(layout), fields(source = %source))]
    pub fn load(layout: &Layout, source: &Source) -> Result<Self, StateError> {
        let texts_dir = layout.texts_dir(source);
        let mut already = HashSet::new();
        match fs::read_dir(&texts_dir) {
            Ok(entries) => {
                for entry in entries {
                    let entry = entry.map_err(|e| StateError::io(&texts_dir, e))?;
                    let name = entry.file_name().to_string_lossy().into_owned();
                    let identifier = name.strip_suffix(ARTIFACT_SUFFIX).unwrap_or(&name);
                    already.insert(identifier.to_string());
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StateError::io(&texts_dir, e)),
        }

        let corrupt_file = layout.corrupt_file(source);
        let mut corrupt = HashSet::new();
        if corrupt_file.exists() {
            let mut reader = csv::Reader::from_path(&corrupt_file)
                .map_err(|e| StateError::csv(&corrupt_file, e))?;
            for row in reader.deserialize::<CorruptRow>() {
                let row = row.map_err(|e| StateError::csv(&corrupt_file, e))?;
                corrupt.insert(row.identifier);
            }
        }

        debug!(
            already = already.len(),
            corrupt = corrupt.len(),
            "ledger loaded"
        );

        Ok(Self {
            already,
            corrupt,
            pending_corrupt: Vec::new(),
            corrupt_file,
        })
    }

    /// True when `identifier` already has an extraction artifact.
    #[must_use]
    pub fn already_downloaded(&self, identifier: &str) -> bool {
        self.already.contains(identifier)
    }

    /// True when `identifier` is marked corrupt.
    #[must_use]
    pub fn is_corrupt(&self, identifier: &str) -> bool {
        self.corrupt.contains(identifier)
    }

    /// Records an in-run success so a catalog that repeats an item within
    /// one run stays idempotent.
    pub fn record_downloaded(&mut self, identifier: impl Into<String>) {
        self.already.insert(identifier.into());
    }

    /// Marks `identifier` corrupt, effective immediately for this run's
    /// skip decisions. The marker is persisted by [`commit_corrupt`].
    ///
    /// [`commit_corrupt`]: Self::commit_corrupt
    pub fn mark_corrupt(&mut self, identifier: impl Into<String>) {
        let identifier = identifier.into();
        if self.corrupt.insert(identifier.clone()) {
            self.pending_corrupt.push(identifier);
        }
    }

    /// Appends the markers accumulated since the last commit to the
    /// corrupt-marker file, creating it (with its header) on first use.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the marker file cannot be appended to. The
    /// pending markers are kept for a later retry in that case.
    #[instrument(skip(self))]
    pub fn commit_corrupt(&mut self) -> Result<usize, StateError> {
        if self.pending_corrupt.is_empty() {
            return Ok(0);
        }

        let new_file = !self.corrupt_file.exists();
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.corrupt_file)
            .map_err(|e| StateError::io(&self.corrupt_file, e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(new_file)
            .from_writer(file);
        for identifier in &self.pending_corrupt {
            writer
                .serialize(CorruptRow {
                    identifier: identifier.clone(),
                })
                .map_err(|e| StateError::csv(&self.corrupt_file, e))?;
        }
        writer
            .flush()
            .map_err(|e| StateError::io(&self.corrupt_file, e))?;

        let committed = self.pending_corrupt.len();
        self.pending_corrupt.clear();
        debug!(committed, "corrupt markers committed");
        Ok(committed)
    }
}
