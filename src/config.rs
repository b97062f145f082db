//! Process-wide configuration: catalog sources, format whitelist, and the
//! on-disk layout of everything the pipeline persists.
//!
//! The source set is a constant loaded at startup; nothing here is mutated
//! after the CLI has been parsed.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Base endpoint of the Knesset parliament OData service.
pub const DEFAULT_ENDPOINT: &str = "http://knesset.gov.il/Odata/ParliamentInfo.svc";

/// Document catalogs scraped by the `download` command.
pub const DOCUMENT_SOURCES: [&str; 3] = [
    "KNS_DocumentBill",
    "KNS_DocumentPlenumSession",
    "KNS_DocumentCommitteeSession",
];

/// Metadata tables mirrored by the `metadata` command (raw JSON pages only).
pub const METADATA_TABLES: [&str; 2] = ["KNS_PlenumSession", "KNS_Committee"];

/// File-format suffixes accepted for download (compared case-insensitively).
pub const WORD_FORMATS: [&str; 2] = ["doc", "docx"];

/// Fixed delay between retries when a catalog page body lacks the item
/// collection key. The upstream catalog is eventually consistent; retry is
/// unbounded by count and bounded only by operator-visible logs.
pub const DEFAULT_PAGE_RETRY_DELAY: Duration = Duration::from_secs(10);

/// HTTP connect timeout in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// HTTP read timeout in seconds (documents can be large).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// One logical catalog on the remote OData service.
///
/// Identified by its table name (e.g. `KNS_DocumentBill`); all local
/// directory and state-file names derive from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    table: String,
}

impl Source {
    /// Creates a source for the given OData table name.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// The OData table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.table)
    }
}

/// The default document sources, in download order.
#[must_use]
pub fn document_sources() -> Vec<Source> {
    DOCUMENT_SOURCES.iter().copied().map(Source::new).collect()
}

/// The default metadata tables, in mirror order.
#[must_use]
pub fn metadata_tables() -> Vec<Source> {
    METADATA_TABLES.iter().copied().map(Source::new).collect()
}

/// On-disk layout of all persisted pipeline state, rooted at a data
/// directory.
///
/// Per source: a documents directory for raw downloads, an extracted-texts
/// directory for `.txt` artifacts, an append-only corrupt-marker file, an
/// append-only download log, and (under `state/`) a cursor file and a lock
/// file. Shared: one directory of persisted raw catalog pages.
#[derive(Debug, Clone)]
pub struct Layout {
    data_dir: PathBuf,
}

impl Layout {
    /// Creates a layout rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The root data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory holding raw downloaded documents for `source`.
    #[must_use]
    pub fn documents_dir(&self, source: &Source) -> PathBuf {
        self.data_dir.join(format!("{}_documents", source.table()))
    }

    /// Directory holding extracted-text artifacts for `source`.
    #[must_use]
    pub fn texts_dir(&self, source: &Source) -> PathBuf {
        self.data_dir
            .join(format!("{}_extracted_texts", source.table()))
    }

    /// Directory holding persisted raw catalog page bodies.
    #[must_use]
    pub fn pages_dir(&self) -> PathBuf {
        self.data_dir.join("odata_pages")
    }

    /// Directory holding mirrored metadata table pages for `table`.
    #[must_use]
    pub fn metadata_pages_dir(&self, table: &Source) -> PathBuf {
        self.data_dir
            .join(format!("{}_metadata_pages", table.table()))
    }

    /// Append-only corrupt-marker file for `source`.
    #[must_use]
    pub fn corrupt_file(&self, source: &Source) -> PathBuf {
        self.data_dir
            .join(format!("{}_corrupt_documents.csv", source.table()))
    }

    /// Append-only download log for `source`.
    #[must_use]
    pub fn download_log_file(&self, source: &Source) -> PathBuf {
        self.data_dir
            .join(format!("{}_download_log.csv", source.table()))
    }

    /// Per-knesset summary file written by the `stats` command.
    #[must_use]
    pub fn summary_file(&self, source: &Source) -> PathBuf {
        self.data_dir
            .join(format!("{}_summary_per_knesset.csv", source.table()))
    }

    /// Directory holding cursor and lock files.
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.data_dir.join("state")
    }

    /// Cursor file for `source`.
    #[must_use]
    pub fn cursor_file(&self, source: &Source) -> PathBuf {
        self.state_dir().join(format!("{}.cursor", source.table()))
    }

    /// Lock file guarding `source` against concurrent runs.
    #[must_use]
    pub fn lock_file(&self, source: &Source) -> PathBuf {
        self.state_dir().join(format!("{}.lock", source.table()))
    }

    /// Creates the directories a source's download run writes into.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error if a directory cannot be created.
    pub fn ensure_source_dirs(&self, source: &Source) -> std::io::Result<()> {
        std::fs::create_dir_all(self.documents_dir(source))?;
        std::fs::create_dir_all(self.texts_dir(source))?;
        std::fs::create_dir_all(self.pages_dir())?;
        std::fs::create_dir_all(self.state_dir())?;
        Ok(())
    }
}
