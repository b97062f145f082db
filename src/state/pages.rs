//! Raw catalog page persistence.
//!
//! Every accepted page body is kept verbatim as JSON; the statistics
//! consumer reads these files instead of re-querying the catalog. Files are
//! named from the page's continuation token so a re-fetched page overwrites
//! its earlier copy; the terminal page is named `{table}_last.json`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::catalog::CatalogPage;

use super::error::StateError;

/// File stem for a page, derived from its continuation token.
#[must_use]
pub fn page_file_stem(table: &str, page: &CatalogPage) -> String {
    match page.next_link() {
        Some(link) => link.replace("?$skiptoken=", "_").replace('/', "_"),
        None => format!("{table}_last"),
    }
}

/// Writes the page body into `dir` and returns the file path.
///
/// # Errors
///
/// Returns [`StateError::Io`] if the page file cannot be written.
pub fn persist_page(dir: &Path, table: &str, page: &CatalogPage) -> Result<PathBuf, StateError> {
    let path = dir.join(format!("{}.json", page_file_stem(table, page)));
    let body = serde_json::to_string(page.body())
        .map_err(|e| StateError::io(&path, std::io::Error::other(e)))?;
    fs::write(&path, body).map_err(|e| StateError::io(&path, e))?;
    debug!(path = %path.display(), "page body persisted");
    Ok(path)
}
