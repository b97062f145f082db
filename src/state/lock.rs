//! Advisory per-source locking.
//!
//! Two concurrent runs of the same source would race on its ledger and
//! cursor files; an exclusive advisory lock on a per-source lock file keeps
//! the second run out. The lock releases when the guard drops, including on
//! panic.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use super::error::StateError;

/// Exclusive lock on one source's persisted state.
///
/// Held for the whole of a source's download loop.
#[derive(Debug)]
pub struct SourceLock {
    file: File,
    path: PathBuf,
}

impl SourceLock {
    /// Acquires the lock, failing fast if another run holds it.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::SourceLocked`] when the lock is held elsewhere,
    /// or [`StateError::Io`] if the lock file cannot be created.
    pub fn acquire(path: &Path) -> Result<Self, StateError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|e| StateError::io(path, e))?;

        file.try_lock_exclusive()
            .map_err(|_| StateError::SourceLocked {
                path: path.to_path_buf(),
            })?;

        debug!(path = %path.display(), "source lock acquired");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for SourceLock {
    fn drop(&mut self) {
        if let Err(e) = fs2::FileExt::unlock(&self.file) {
            debug!(path = %self.path.display(), error = %e, "failed to release source lock");
        }
    }
}
