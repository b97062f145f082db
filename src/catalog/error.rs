//! Error types for catalog page fetching.

use thiserror::Error;

/// Errors that end a source's page loop.
///
/// Transient body anomalies (a page without the item collection key) are
/// never surfaced here; the fetcher retries those internally on a fixed
/// delay. Everything below is fatal to the current source's loop and leaves
/// its cursor unadvanced so a re-run resumes the same page.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching catalog page {url}: {source}")]
    Network {
        /// The page URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} fetching catalog page {url}")]
    HttpStatus {
        /// The page URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body was not decodable as JSON at all.
    #[error("malformed catalog response from {url}: {source}")]
    MalformedBody {
        /// The page URL that returned the body.
        url: String,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },

    /// The `$count` probe returned something that is not a count.
    #[error("unexpected count response from {url}: {body:?}")]
    UnexpectedCount {
        /// The count URL.
        url: String,
        /// The body that failed to parse as an integer.
        body: String,
    },
}

impl CatalogError {
    /// Creates a network error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a malformed-body error.
    pub fn malformed_body(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::MalformedBody {
            url: url.into(),
            source,
        }
    }
}
