//! Per-source pagination cursor persistence.
//!
//! One small file per source under the state directory. No file (or an
//! empty one) means "begin from the catalog's first page". The orchestrator
//! persists the cursor after every committed page, so a crash loses at most
//! one unprocessed page and never re-commits a processed one out of order.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::config::{Layout, Source};

use super::error::StateError;

/// Loads and saves the pagination cursor for each source.
#[derive(Debug, Clone)]
pub struct CursorStore {
    layout: Layout,
}

impl CursorStore {
    /// Creates a store over the layout's state directory.
    #[must_use]
    pub fn new(layout: &Layout) -> Self {
        Self {
            layout: layout.clone(),
        }
    }

    fn cursor_path(&self, source: &Source) -> PathBuf {
        self.layout.cursor_file(source)
    }

    /// Loads the persisted cursor for `source`.
    ///
    /// Returns `None` when no cursor has been persisted (start of catalog)
    /// or when the last committed page exhausted the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] if the cursor file exists but cannot be
    /// read.
    #[instrument(skip(self), fields(source = %source))]
    pub fn load(&self, source: &Source) -> Result<Option<String>, StateError> {
        let path = self.cursor_path(source);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let cursor = contents.trim();
                debug!(cursor, "loaded cursor");
                Ok((!cursor.is_empty()).then(|| cursor.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StateError::io(path, e)),
        }
    }

    /// Persists the cursor for `source`.
    ///
    /// `None` truncates the file, so a finished source never resurrects a
    /// stale token on a later run. The write goes through a temp file and an
    /// atomic rename.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] if the file cannot be written.
    #[instrument(skip(self), fields(source = %source))]
    pub fn save(&self, source: &Source, cursor: Option<&str>) -> Result<(), StateError> {
        let path = self.cursor_path(source);
        write_atomic(&path, cursor.unwrap_or_default())
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), StateError> {
    let tmp = path.with_extension("cursor.tmp");
    fs::write(&tmp, contents).map_err(|e| StateError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| StateError::io(path, e))
}
