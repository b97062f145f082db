//! Metadata table mirroring.
//!
//! Metadata tables (plenum sessions, committees) carry no document links;
//! mirroring them is the page loop without item processing: fetch each
//! page, persist its raw body, advance the cursor. The same cursor store
//! makes interrupted mirrors resumable.

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::catalog::{CatalogError, PageFetcher};
use crate::config::{Layout, Source};
use crate::state::{CursorStore, SourceLock, StateError, persist_page};

/// Errors that end one table's mirror loop.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The catalog could not be fetched.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// Local state could not be read or written.
    #[error(transparent)]
    State(#[from] StateError),
}

/// Accounting for one mirrored table.
#[derive(Debug)]
pub struct TableReport {
    /// The mirrored table.
    pub table: Source,
    /// Pages persisted this run.
    pub pages: usize,
    /// Set when the loop terminated abnormally; state stays resumable.
    pub error: Option<String>,
}

/// Mirrors metadata tables page by page.
#[derive(Debug)]
pub struct MetadataMirror {
    layout: Layout,
    pages: PageFetcher,
}

impl MetadataMirror {
    /// Creates a mirror over `layout`.
    #[must_use]
    pub fn new(layout: Layout, pages: PageFetcher) -> Self {
        Self { layout, pages }
    }

    /// Mirrors every table in order; per-table failures are captured in the
    /// reports, never aborting the run.
    pub async fn run(&self, tables: &[Source]) -> Vec<TableReport> {
        let mut reports = Vec::with_capacity(tables.len());
        for table in tables {
            reports.push(self.mirror_table(table).await);
        }
        reports
    }

    /// Mirrors one table to exhaustion or early termination.
    #[instrument(skip(self), fields(table = %table))]
    pub async fn mirror_table(&self, table: &Source) -> TableReport {
        let mut report = TableReport {
            table: table.clone(),
            pages: 0,
            error: None,
        };
        if let Err(e) = self.drive_table(table, &mut report).await {
            warn!(table = %table, error = %e, "mirror terminated early, state left resumable");
            report.error = Some(e.to_string());
        }
        report
    }

    async fn drive_table(
        &self,
        table: &Source,
        report: &mut TableReport,
    ) -> Result<(), MetadataError> {
        let pages_dir = self.layout.metadata_pages_dir(table);
        std::fs::create_dir_all(&pages_dir).map_err(|e| StateError::io(&pages_dir, e))?;
        std::fs::create_dir_all(self.layout.state_dir())
            .map_err(|e| StateError::io(self.layout.state_dir(), e))?;
        let _lock = SourceLock::acquire(&self.layout.lock_file(table))?;

        match self.pages.count(table.table()).await {
            Ok(total) => info!(table = %table, total, "records on table"),
            Err(e) => warn!(table = %table, error = %e, "catalog size probe failed"),
        }

        let cursors = CursorStore::new(&self.layout);
        let mut cursor = cursors.load(table)?;

        loop {
            let page = self
                .pages
                .fetch_page(table.table(), cursor.as_deref())
                .await?;
            report.pages += 1;

            persist_page(&pages_dir, table.table(), &page)?;
            info!(table = %table, page = report.pages, records = page.entries().len(), "page mirrored");

            let next = page.next_link().map(str::to_string);
            cursors.save(table, next.as_deref())?;

            match next {
                Some(token) => cursor = Some(token),
                None => break,
            }
        }

        info!(table = %table, pages = report.pages, "table exhausted");
        Ok(())
    }
}
