//! Locally persisted pipeline state.
//!
//! Everything a run needs to resume safely lives in plain per-source files:
//! a cursor file ([`CursorStore`]), an append-only corrupt-marker file and
//! the derived already-downloaded set ([`DownloadLedger`]), an append-only
//! download log ([`DownloadLog`]), and an advisory lock ([`SourceLock`])
//! keeping two concurrent runs off the same source.

mod cursor;
mod download_log;
mod error;
mod ledger;
mod lock;
mod pages;

pub use cursor::CursorStore;
pub use download_log::{DownloadLog, LogRow};
pub use error::StateError;
pub use ledger::DownloadLedger;
pub use lock::SourceLock;
pub use pages::{page_file_stem, persist_page};
