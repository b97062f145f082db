//! The paginated ingestion and idempotent download pipeline.
//!
//! The [`Pipeline`] drives each source page by page: fetch the page,
//! classify and process every item with per-item failure isolation, then
//! commit the download log, new corrupt markers, and the cursor before
//! moving on. A page-fetch failure ends the source's loop early with its
//! state resumable; no single item failure ever affects its siblings or the
//! cursor commit.

mod classify;
mod error;
mod fetch;
mod orchestrator;
mod outcome;

pub use classify::classify;
pub use error::ItemError;
pub use fetch::FileFetcher;
pub use orchestrator::{Pipeline, SourceReport};
pub use outcome::{Decision, PageCounts, ProcessingOutcome};
