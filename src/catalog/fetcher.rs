//! HTTP fetcher for catalog pages.
//!
//! One GET per page. A decoded body that lacks the item collection key is a
//! transient anomaly: the fetcher logs it and retries the same request after
//! a fixed delay, indefinitely (the upstream catalog is eventually
//! consistent; the retry is bounded by operator-visible logs, not a count).
//! HTTP-layer failures and undecodable bodies are hard [`CatalogError`]s
//! surfaced to the caller.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::error::CatalogError;
use super::page::{CatalogPage, COLLECTION_KEY};
use crate::config::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};

/// Fetches catalog pages from an OData service.
///
/// Created once per run and reused across sources, taking advantage of
/// connection pooling.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    endpoint: String,
    retry_delay: Duration,
}

impl PageFetcher {
    /// Creates a fetcher against `endpoint` (no trailing slash) with the
    /// given fixed retry delay for transient page anomalies.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(endpoint: impl Into<String>, retry_delay: Duration) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            retry_delay,
        }
    }

    /// The configured fixed retry delay.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Builds the page URL for `table`, splicing in the cursor's
    /// continuation parameter when present.
    ///
    /// Continuation links look like `KNS_DocumentBill?$skiptoken=128985L`;
    /// only the query part after `?$` is carried over.
    #[must_use]
    pub fn page_url(&self, table: &str, cursor: Option<&str>) -> String {
        let mut url = format!("{}/{}?$format=json", self.endpoint, table);
        if let Some(cursor) = cursor {
            let token = cursor
                .split_once("?$")
                .map_or(cursor, |(_, token)| token);
            url.push_str("&$");
            url.push_str(token);
        }
        url
    }

    /// Fetches one catalog page.
    ///
    /// Retries indefinitely, on a fixed delay, while the decoded body lacks
    /// the item collection key. A body carrying the key is accepted even
    /// when the collection is empty.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] for network failures, non-success HTTP
    /// statuses, and bodies that are not JSON. These are fatal to the
    /// calling source's loop; its cursor stays unadvanced.
    #[instrument(skip(self))]
    pub async fn fetch_page(
        &self,
        table: &str,
        cursor: Option<&str>,
    ) -> Result<CatalogPage, CatalogError> {
        let url = self.page_url(table, cursor);
        info!(url = %url, "fetching catalog page");

        loop {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| CatalogError::network(&url, e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(CatalogError::http_status(&url, status.as_u16()));
            }

            let body: Value = response
                .json()
                .await
                .map_err(|e| CatalogError::malformed_body(&url, e))?;

            if body.get(COLLECTION_KEY).and_then(Value::as_array).is_none() {
                warn!(
                    url = %url,
                    body = %body,
                    retry_delay_secs = self.retry_delay.as_secs(),
                    "catalog page has no item collection, retrying"
                );
                tokio::time::sleep(self.retry_delay).await;
                continue;
            }

            let page = CatalogPage::new(body);
            debug!(items = page.entries().len(), terminal = page.is_terminal(), "page accepted");
            return Ok(page);
        }
    }

    /// Probes the `$count` endpoint of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on network failure, a non-success status, or
    /// a body that is not an integer count.
    #[instrument(skip(self))]
    pub async fn count(&self, table: &str) -> Result<u64, CatalogError> {
        let url = format!("{}/{}/$count", self.endpoint, table);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::network(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::http_status(&url, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::network(&url, e))?;

        body.trim()
            .parse::<u64>()
            .map_err(|_| CatalogError::UnexpectedCount { url, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> PageFetcher {
        PageFetcher::new("http://odata.test/svc", Duration::from_millis(10))
    }

    #[test]
    fn test_page_url_without_cursor() {
        assert_eq!(
            fetcher().page_url("KNS_DocumentBill", None),
            "http://odata.test/svc/KNS_DocumentBill?$format=json"
        );
    }

    #[test]
    fn test_page_url_splices_continuation_token() {
        assert_eq!(
            fetcher().page_url(
                "KNS_DocumentBill",
                Some("KNS_DocumentBill?$skiptoken=128985L")
            ),
            "http://odata.test/svc/KNS_DocumentBill?$format=json&$skiptoken=128985L"
        );
    }

    #[test]
    fn test_page_url_accepts_bare_token() {
        // A cursor without the "?$" marker is treated as the token itself.
        assert_eq!(
            fetcher().page_url("KNS_DocumentBill", Some("skiptoken=42L")),
            "http://odata.test/svc/KNS_DocumentBill?$format=json&$skiptoken=42L"
        );
    }

    #[test]
    fn test_endpoint_trailing_slash_is_normalized() {
        let fetcher = PageFetcher::new("http://odata.test/svc/", Duration::from_secs(1));
        assert_eq!(
            fetcher.page_url("KNS_Committee", None),
            "http://odata.test/svc/KNS_Committee?$format=json"
        );
    }
}
