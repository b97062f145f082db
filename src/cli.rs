//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use knesset_corpus::DEFAULT_ENDPOINT;

/// Download and organize the Knesset's public document corpus.
///
/// Walks the parliament's paginated OData catalogs, downloads each
/// referenced document exactly once, extracts plain text, and keeps
/// resumable per-source state on disk.
#[derive(Parser, Debug)]
#[command(name = "knesset-corpus")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Root directory for downloads and persisted state
    #[arg(short = 'd', long, default_value = ".", global = true)]
    pub data_dir: PathBuf,

    /// Base OData endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT, global = true)]
    pub endpoint: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download documents from the configured catalog sources
    Download {
        /// Source table to download (repeatable; defaults to all three)
        #[arg(long = "source")]
        sources: Vec<String>,

        /// Seconds between retries on a malformed catalog page (1-600)
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..=600))]
        page_retry_delay: u64,
    },

    /// Mirror metadata tables as raw JSON pages
    Metadata {
        /// Table to mirror (repeatable; defaults to the standard set)
        #[arg(long = "table")]
        tables: Vec<String>,
    },

    /// Aggregate statistics over the downloaded corpus
    Stats,
}
