//! CLI entry point for the Knesset corpus downloader.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use knesset_corpus::{
    DocxExtractor, ExtractionDispatcher, FileFetcher, Layout, MetadataMirror, PageFetcher,
    Pipeline, Source, config, stats,
};
use tracing::{debug, info, warn};

mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("Knesset corpus downloader starting");

    let layout = Layout::new(&args.data_dir);

    match args.command {
        Command::Download {
            sources,
            page_retry_delay,
        } => {
            let sources = if sources.is_empty() {
                config::document_sources()
            } else {
                sources.into_iter().map(Source::new).collect()
            };

            let pages =
                PageFetcher::new(args.endpoint.as_str(), Duration::from_secs(page_retry_delay));
            let dispatcher = ExtractionDispatcher::new(Box::new(DocxExtractor::new()));
            let mut pipeline = Pipeline::new(layout, pages, FileFetcher::new(), dispatcher);

            let reports = pipeline.run(&sources).await;

            let mut failed_sources = 0;
            for report in &reports {
                info!(
                    source = %report.source,
                    pages = report.pages,
                    counts = %report.counts,
                    "source summary"
                );
                if let Some(error) = &report.error {
                    warn!(source = %report.source, error, "source terminated early");
                    failed_sources += 1;
                }
            }

            if failed_sources > 0 {
                anyhow::bail!("{failed_sources} source(s) terminated early; re-run to resume");
            }
        }

        Command::Metadata { tables } => {
            let tables = if tables.is_empty() {
                config::metadata_tables()
            } else {
                tables.into_iter().map(Source::new).collect()
            };

            let pages =
                PageFetcher::new(args.endpoint.as_str(), config::DEFAULT_PAGE_RETRY_DELAY);
            let mirror = MetadataMirror::new(layout, pages);
            let reports = mirror.run(&tables).await;

            let mut failed_tables = 0;
            for report in &reports {
                info!(table = %report.table, pages = report.pages, "table summary");
                if let Some(error) = &report.error {
                    warn!(table = %report.table, error, "mirror terminated early");
                    failed_tables += 1;
                }
            }

            if failed_tables > 0 {
                anyhow::bail!("{failed_tables} table(s) terminated early; re-run to resume");
            }
        }

        Command::Stats => {
            let volumes = stats::run(&layout, &config::document_sources())?;
            for volume in &volumes {
                info!(
                    source = %volume.source,
                    files = volume.files,
                    words = volume.words,
                    volume_mib = format!("{:.1}", volume.volume_mib),
                    "corpus summary"
                );
            }
        }
    }

    info!("Done");
    Ok(())
}
