//! Page-by-page source orchestration.
//!
//! For each source: fetch page, classify and process every item, commit
//! (download log, new corrupt markers, cursor), then advance or terminate.
//! The cursor is persisted only after every item of its page was attempted,
//! so persisted state is always consistent with "fully processed up to and
//! including the last committed page". A page-fetch failure terminates the
//! source's loop without advancing the cursor; a re-run resumes at the same
//! page.

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::catalog::{CatalogError, CatalogItem, CatalogPage, PageFetcher};
use crate::config::{Layout, Source, WORD_FORMATS};
use crate::extract::{ExtractionDispatcher, ExtractionOutcome};
use crate::state::{
    CursorStore, DownloadLedger, DownloadLog, LogRow, SourceLock, StateError, persist_page,
};

use super::classify::classify;
use super::error::ItemError;
use super::fetch::FileFetcher;
use super::outcome::{Decision, PageCounts, ProcessingOutcome};

/// Why a source's loop ended before exhausting its catalog.
#[derive(Debug, Error)]
enum SourceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    State(#[from] StateError),
}

/// End-of-run accounting for one source.
#[derive(Debug)]
pub struct SourceReport {
    /// The source this report covers.
    pub source: Source,
    /// Pages fully processed and committed.
    pub pages: usize,
    /// Item outcome counts summed over all processed pages.
    pub counts: PageCounts,
    /// Set when the loop terminated abnormally; state stays resumable.
    pub error: Option<String>,
}

impl SourceReport {
    fn new(source: &Source) -> Self {
        Self {
            source: source.clone(),
            pages: 0,
            counts: PageCounts::default(),
            error: None,
        }
    }
}

/// Drives the ingestion pipeline over one or more sources, strictly
/// sequentially: one page, one item, one extraction in flight at a time.
/// That bounds the load on the upstream API by design, not as an
/// implementation detail.
#[derive(Debug)]
pub struct Pipeline {
    layout: Layout,
    pages: PageFetcher,
    files: FileFetcher,
    dispatcher: ExtractionDispatcher,
    formats: Vec<&'static str>,
}

impl Pipeline {
    /// Assembles a pipeline over `layout` with the default format
    /// whitelist.
    #[must_use]
    pub fn new(
        layout: Layout,
        pages: PageFetcher,
        files: FileFetcher,
        dispatcher: ExtractionDispatcher,
    ) -> Self {
        Self {
            layout,
            pages,
            files,
            dispatcher,
            formats: WORD_FORMATS.to_vec(),
        }
    }

    /// Runs every source in order. Individual sources failing never aborts
    /// the run; each failure is captured in that source's report.
    pub async fn run(&mut self, sources: &[Source]) -> Vec<SourceReport> {
        let mut reports = Vec::with_capacity(sources.len());
        for source in sources {
            reports.push(self.run_source(source).await);
        }
        reports
    }

    /// Runs one source to exhaustion or early termination.
    #[instrument(skip(self), fields(source = %source))]
    pub async fn run_source(&mut self, source: &Source) -> SourceReport {
        let mut report = SourceReport::new(source);
        if let Err(e) = self.drive_source(source, &mut report).await {
            warn!(source = %source, error = %e, "source terminated early, state left resumable");
            report.error = Some(e.to_string());
        }
        report
    }

    async fn drive_source(
        &mut self,
        source: &Source,
        report: &mut SourceReport,
    ) -> Result<(), SourceError> {
        self.layout
            .ensure_source_dirs(source)
            .map_err(|e| StateError::io(self.layout.data_dir(), e))?;
        let _lock = SourceLock::acquire(&self.layout.lock_file(source))?;

        match self.pages.count(source.table()).await {
            Ok(total) => info!(source = %source, total, "documents on source"),
            Err(e) => debug!(source = %source, error = %e, "catalog size probe failed"),
        }

        let mut ledger = DownloadLedger::load(&self.layout, source)?;
        let log = DownloadLog::new(&self.layout, source);
        let cursors = CursorStore::new(&self.layout);
        let mut cursor = cursors.load(source)?;
        let pages_dir = self.layout.pages_dir();

        loop {
            // A fetch failure propagates before the cursor moves, so a
            // re-run resumes at this same page.
            let page = self
                .pages
                .fetch_page(source.table(), cursor.as_deref())
                .await?;
            report.pages += 1;

            persist_page(&pages_dir, source.table(), &page)?;

            let (counts, rows) = self.process_page(source, &page, &mut ledger).await;
            report.counts += counts;
            info!(source = %source, page = report.pages, %counts, "page processed");

            log.append(&rows)?;
            ledger.commit_corrupt()?;

            let next = page.next_link().map(str::to_string);
            cursors.save(source, next.as_deref())?;

            match next {
                Some(token) => cursor = Some(token),
                None => break,
            }
        }

        info!(source = %source, pages = report.pages, "catalog exhausted");
        Ok(())
    }

    /// Processes every item of a page in catalog order. Per-item failures
    /// are folded into outcomes; nothing here aborts the page.
    async fn process_page(
        &mut self,
        source: &Source,
        page: &CatalogPage,
        ledger: &mut DownloadLedger,
    ) -> (PageCounts, Vec<LogRow>) {
        let documents_dir = self.layout.documents_dir(source);
        let texts_dir = self.layout.texts_dir(source);
        let total = page.entries().len();
        let mut counts = PageCounts::default();
        let mut rows = Vec::new();

        for (index, entry) in page.entries().iter().enumerate() {
            let Some(item) = CatalogItem::from_entry(entry) else {
                warn!(index, total, "catalog entry has no file path");
                counts.record(&ProcessingOutcome::Failed(ItemError::MissingFilePath));
                continue;
            };

            let outcome = self
                .process_item(&item, &documents_dir, &texts_dir, ledger, index, total)
                .await;

            match &outcome {
                ProcessingOutcome::Downloaded(ExtractionOutcome::CorruptSource) => {
                    ledger.mark_corrupt(item.identifier());
                }
                ProcessingOutcome::Downloaded(extraction) => {
                    let word_count = match extraction {
                        ExtractionOutcome::Written(words) => {
                            ledger.record_downloaded(item.identifier());
                            Some(*words)
                        }
                        _ => None,
                    };
                    rows.push(LogRow {
                        identifier: item.identifier().to_string(),
                        remote_path: item.file_path().to_string(),
                        word_count,
                    });
                }
                _ => {}
            }

            counts.record(&outcome);
        }

        (counts, rows)
    }

    async fn process_item(
        &mut self,
        item: &CatalogItem,
        documents_dir: &std::path::Path,
        texts_dir: &std::path::Path,
        ledger: &DownloadLedger,
        index: usize,
        total: usize,
    ) -> ProcessingOutcome {
        match classify(item, ledger, &self.formats) {
            Decision::SkipAlreadyDownloaded => {
                debug!(index, total, url = item.file_path(), "already downloaded");
                return ProcessingOutcome::SkippedAlreadyDownloaded;
            }
            Decision::SkipUnsupportedFormat => {
                debug!(index, total, url = item.file_path(), "unsupported format");
                return ProcessingOutcome::SkippedUnsupportedFormat;
            }
            Decision::SkipCorrupt => {
                debug!(index, total, url = item.file_path(), "known corrupt");
                return ProcessingOutcome::SkippedCorrupt;
            }
            Decision::Proceed => {}
        }

        info!(index, total, url = item.file_path(), "downloading");
        if let Err(e) = self.files.fetch(item, documents_dir).await {
            warn!(url = item.file_path(), error = %e, "download failed");
            return ProcessingOutcome::Failed(e);
        }

        match self
            .dispatcher
            .extract(documents_dir, texts_dir, item.identifier())
            .await
        {
            Ok(extraction) => ProcessingOutcome::Downloaded(extraction),
            Err(e) => {
                warn!(url = item.file_path(), error = %e, "extraction bookkeeping failed");
                ProcessingOutcome::Failed(e.into())
            }
        }
    }
}
