//! Single-item binary download.
//!
//! One GET per accepted item, streamed to disk under the item's stable
//! identifier inside the source's documents directory. A non-200 status is
//! a per-item failure outcome for the orchestrator to count, never an
//! exception escaping the page loop. No retry here: the ledger makes a
//! re-run cheap, so transient item failures heal on the next run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};

use crate::catalog::CatalogItem;
use crate::config::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};

use super::error::ItemError;

/// Downloads item binaries.
///
/// Created once per run and reused, taking advantage of connection pooling.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    client: Client,
}

impl Default for FileFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FileFetcher {
    /// Creates a fetcher with the default timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Fetches one item's binary into `documents_dir`, creating the
    /// directory on demand. The local name is the item's stable identifier
    /// (the remote path's final segment).
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::HttpStatus`] for any non-200 response,
    /// [`ItemError::Network`] for transport failures, and [`ItemError::Io`]
    /// when the bytes cannot be persisted.
    #[instrument(skip(self, documents_dir), fields(url = item.file_path()))]
    pub async fn fetch(
        &self,
        item: &CatalogItem,
        documents_dir: &Path,
    ) -> Result<PathBuf, ItemError> {
        let url = item.file_path();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ItemError::network(url, e))?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(ItemError::http_status(url, status.as_u16()));
        }

        tokio::fs::create_dir_all(documents_dir)
            .await
            .map_err(|e| ItemError::io(documents_dir, e))?;

        let path = documents_dir.join(item.identifier());
        let file = File::create(&path)
            .await
            .map_err(|e| ItemError::io(&path, e))?;
        let mut writer = BufWriter::new(file);

        let mut stream = response.bytes_stream();
        let mut bytes_written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ItemError::network(url, e))?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| ItemError::io(&path, e))?;
            bytes_written += chunk.len() as u64;
        }

        writer.flush().await.map_err(|e| ItemError::io(&path, e))?;

        debug!(path = %path.display(), bytes_written, "document downloaded");
        Ok(path)
    }
}
