//! Catalog page body model.
//!
//! OData wraps each page in an envelope: the item collection under `value`,
//! an optional continuation link under `odata.nextLink`, and a metadata/
//! source-identifier string under `odata.metadata`. The continuation link is
//! opaque to everything except the fetcher, which splices its query part
//! into the next request.

use serde_json::Value;

/// Key of the item collection in a page body.
pub(crate) const COLLECTION_KEY: &str = "value";

/// Key of the continuation link in a page body.
pub(crate) const NEXT_LINK_KEY: &str = "odata.nextLink";

/// Key of the metadata/source identifier in a page body.
pub(crate) const METADATA_KEY: &str = "odata.metadata";

/// One accepted catalog page.
///
/// Constructed only by the fetcher after it has validated that the body
/// carries the item collection key; the raw body is retained so the
/// orchestrator can persist it verbatim.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    body: Value,
}

impl CatalogPage {
    /// Wraps a validated page body.
    pub(crate) fn new(body: Value) -> Self {
        Self { body }
    }

    /// The raw page body, exactly as returned by the catalog.
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// The item entries of this page, in catalog order.
    #[must_use]
    pub fn entries(&self) -> &[Value] {
        self.body
            .get(COLLECTION_KEY)
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }

    /// The continuation link to the next page, if any.
    ///
    /// Absence (or an empty string) signals catalog exhaustion when combined
    /// with an empty item collection.
    #[must_use]
    pub fn next_link(&self) -> Option<&str> {
        self.body
            .get(NEXT_LINK_KEY)
            .and_then(Value::as_str)
            .filter(|link| !link.is_empty())
    }

    /// The metadata/source identifier of this page, if present.
    #[must_use]
    pub fn metadata(&self) -> Option<&str> {
        self.body.get(METADATA_KEY).and_then(Value::as_str)
    }

    /// True when the page carries no items and no continuation link.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.next_link().is_none()
    }
}

/// One remote record of a catalog page.
///
/// Ephemeral: exists only during page processing. The stable identifier is
/// the final path segment of the remote file path; the format hint is its
/// lowered suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    file_path: String,
}

impl CatalogItem {
    /// Builds an item from one page entry.
    ///
    /// Returns `None` when the entry carries no `FilePath` field; the caller
    /// converts that into a per-item failure outcome, never a page abort.
    #[must_use]
    pub fn from_entry(entry: &Value) -> Option<Self> {
        let file_path = entry.get("FilePath")?.as_str()?;
        if file_path.is_empty() {
            return None;
        }
        Some(Self {
            file_path: file_path.to_string(),
        })
    }

    /// The remote file path/URL of the document.
    #[must_use]
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Stable identifier: the final path segment of the remote path.
    #[must_use]
    pub fn identifier(&self) -> &str {
        self.file_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.file_path)
    }

    /// File-format hint: the lowered suffix of the identifier, or empty.
    #[must_use]
    pub fn format_suffix(&self) -> String {
        self.identifier()
            .rsplit_once('.')
            .map(|(_, suffix)| suffix.to_ascii_lowercase())
            .unwrap_or_default()
    }
}
