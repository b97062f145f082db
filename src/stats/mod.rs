//! Corpus statistics: a read-only consumer of the pipeline's outputs.
//!
//! Two reports, both derived purely from local state with no network
//! access: per-knesset record counts grouped by file format (from the
//! persisted catalog pages), and per-source corpus volume (from the
//! extracted-text directories).

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::{Layout, Source};

/// Host prefix a document path must carry for its knesset number to be
/// recoverable from the first path segment.
const KNESSET_HOST_PREFIX: &str = "https://fs.knesset.gov.il//";

/// Knesset numbers are small; anything at or above this is a false match
/// (a year, a session id) and is ignored.
const MAX_KNESSET_NUM: i64 = 50;

/// Errors raised while aggregating statistics.
#[derive(Debug, Error)]
pub enum StatsError {
    /// A local file or directory could not be read or written.
    #[error("IO error on {path}: {source}")]
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A persisted page body could not be parsed.
    #[error("invalid page JSON in {path}: {source}")]
    Json {
        /// The page file.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A summary file could not be written.
    #[error("CSV error on {path}: {source}")]
    Csv {
        /// The summary file.
        path: PathBuf,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },
}

impl StatsError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// One row of a per-knesset summary file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    /// Knesset number, `-1` when not recoverable from the path.
    pub knesset_num: i64,
    /// Lowered file-format suffix.
    pub file_format: String,
    /// Distinct records with this (knesset, format) pair.
    pub count: u64,
    /// Source table the records belong to.
    pub source: String,
}

/// Corpus volume of one source's extracted texts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceVolume {
    /// Source table.
    pub source: String,
    /// Number of text artifacts.
    pub files: u64,
    /// Total words across all artifacts.
    pub words: u64,
    /// Total size in MiB.
    pub volume_mib: f64,
}

/// Recovers the knesset number from a document path.
///
/// Paths look like `https://fs.knesset.gov.il//20/Bills/x.doc`; the first
/// segment after the host prefix is the knesset number. Media paths carry a
/// date there instead, which the `< 50` bound filters out.
#[must_use]
pub fn knesset_num(file_path: &str) -> i64 {
    let Some(rest) = file_path.strip_prefix(KNESSET_HOST_PREFIX) else {
        return -1;
    };
    let Some(first_segment) = rest.split('/').next() else {
        return -1;
    };
    match first_segment.parse::<i64>() {
        Ok(candidate) if candidate < MAX_KNESSET_NUM => candidate,
        _ => -1,
    }
}

/// Lowered file-format suffix of a document path; any suffix containing
/// `aspx` (dynamic pages with query strings) normalizes to `aspx`.
#[must_use]
pub fn file_format(file_path: &str) -> String {
    let suffix = file_path
        .rsplit_once('.')
        .map(|(_, s)| s.to_ascii_lowercase())
        .unwrap_or_default();
    if suffix.contains("aspx") {
        "aspx".to_string()
    } else {
        suffix
    }
}

/// Runs both reports and writes the per-knesset summary files.
///
/// # Errors
///
/// Returns [`StatsError`] if local state cannot be read or a summary file
/// cannot be written.
#[instrument(skip(layout, sources))]
pub fn run(layout: &Layout, sources: &[Source]) -> Result<Vec<SourceVolume>, StatsError> {
    summarize_catalog(layout, sources)?;
    measure_corpus(layout, sources)
}

/// Aggregates the persisted catalog pages into per-knesset summary files.
fn summarize_catalog(layout: &Layout, sources: &[Source]) -> Result<(), StatsError> {
    let pages_dir = layout.pages_dir();
    if !pages_dir.exists() {
        info!("no persisted catalog pages, skipping per-knesset summary");
        return Ok(());
    }

    // (source, file_path) pairs seen so far; pages overlap across runs.
    let mut seen = HashSet::new();
    let mut grouped: BTreeMap<(String, i64, String), u64> = BTreeMap::new();
    let mut files = 0usize;

    for entry in fs::read_dir(&pages_dir).map_err(|e| StatsError::io(&pages_dir, e))? {
        let entry = entry.map_err(|e| StatsError::io(&pages_dir, e))?;
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        files += 1;

        let body: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).map_err(|e| StatsError::io(&path, e))?)
                .map_err(|e| StatsError::Json {
                    path: path.clone(),
                    source: e,
                })?;

        let Some(source) = page_source(&body) else {
            warn!(path = %path.display(), "page has no metadata source, skipping");
            continue;
        };
        let Some(entries) = body.get("value").and_then(serde_json::Value::as_array) else {
            continue;
        };

        for record in entries {
            let Some(file_path) = record.get("FilePath").and_then(serde_json::Value::as_str)
            else {
                continue;
            };
            if !seen.insert((source.clone(), file_path.to_string())) {
                continue;
            }
            let key = (source.clone(), knesset_num(file_path), file_format(file_path));
            *grouped.entry(key).or_default() += 1;
        }
    }

    info!(files, records = seen.len(), "catalog pages aggregated");

    for source in sources {
        let rows: Vec<SummaryRow> = grouped
            .iter()
            .filter(|((s, _, _), _)| s == source.table())
            .map(|((s, knesset, format), count)| SummaryRow {
                knesset_num: *knesset,
                file_format: format.clone(),
                count: *count,
                source: s.clone(),
            })
            .collect();

        if rows.is_empty() {
            debug!(source = %source, "no records for source");
            continue;
        }

        let path = layout.summary_file(source);
        write_summary(&path, &rows)?;
        info!(source = %source, rows = rows.len(), path = %path.display(), "summary written");
    }

    Ok(())
}

/// Source table of a page, recovered from its `odata.metadata` URL.
fn page_source(body: &serde_json::Value) -> Option<String> {
    body.get("odata.metadata")
        .and_then(serde_json::Value::as_str)
        .and_then(|url| url.split("$metadata#").nth(1))
        .map(str::to_string)
}

fn write_summary(path: &Path, rows: &[SummaryRow]) -> Result<(), StatsError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| StatsError::Csv {
        path: path.to_path_buf(),
        source: e,
    })?;
    for row in rows {
        writer.serialize(row).map_err(|e| StatsError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    writer.flush().map_err(|e| StatsError::io(path, e))
}

/// Measures each source's extracted-text corpus: files, words, volume.
fn measure_corpus(layout: &Layout, sources: &[Source]) -> Result<Vec<SourceVolume>, StatsError> {
    let mut volumes = Vec::with_capacity(sources.len());

    for source in sources {
        let dir = layout.texts_dir(source);
        let mut volume = SourceVolume {
            source: source.table().to_string(),
            files: 0,
            words: 0,
            volume_mib: 0.0,
        };

        match fs::read_dir(&dir) {
            Ok(entries) => {
                let mut bytes = 0u64;
                for entry in entries {
                    let entry = entry.map_err(|e| StatsError::io(&dir, e))?;
                    let path = entry.path();
                    let text =
                        fs::read_to_string(&path).map_err(|e| StatsError::io(&path, e))?;
                    volume.files += 1;
                    volume.words += text.split_whitespace().count() as u64;
                    bytes += entry
                        .metadata()
                        .map_err(|e| StatsError::io(&path, e))?
                        .len();
                }
                volume.volume_mib = bytes as f64 / (1024.0 * 1024.0);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(source = %source, "no extracted texts yet");
            }
            Err(e) => return Err(StatsError::io(&dir, e)),
        }

        info!(
            source = %source,
            files = volume.files,
            words = volume.words,
            volume_mib = format!("{:.1}", volume.volume_mib),
            "corpus volume"
        );
        volumes.push(volume);
    }

    Ok(volumes)
}
