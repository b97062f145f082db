//! Per-item skip/proceed classification.

use crate::catalog::CatalogItem;
use crate::state::DownloadLedger;

use super::outcome::Decision;

/// Classifies one catalog item against the run's ledger and the format
/// whitelist. Checks short-circuit in a fixed order:
///
/// 1. already downloaded,
/// 2. unsupported format,
/// 3. known corrupt,
/// 4. proceed.
///
/// Already-downloaded wins over the other checks so the most informative
/// skip reason is the one reported: an item downloaded before a format
/// reclassification, or later marked corrupt, still reads as already
/// downloaded in logs and counters.
#[must_use]
pub fn classify(item: &CatalogItem, ledger: &DownloadLedger, format_whitelist: &[&str]) -> Decision {
    if ledger.already_downloaded(item.identifier()) {
        return Decision::SkipAlreadyDownloaded;
    }

    let suffix = item.format_suffix();
    if !format_whitelist
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(&suffix))
    {
        return Decision::SkipUnsupportedFormat;
    }

    if ledger.is_corrupt(item.identifier()) {
        return Decision::SkipCorrupt;
    }

    Decision::Proceed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{Layout, Source, WORD_FORMATS};
    use serde_json::json;

    fn item(file_path: &str) -> CatalogItem {
        CatalogItem::from_entry(&json!({ "FilePath": file_path })).unwrap()
    }

    fn empty_ledger(tmp: &tempfile::TempDir) -> DownloadLedger {
        let layout = Layout::new(tmp.path());
        let source = Source::new("KNS_DocumentBill");
        layout.ensure_source_dirs(&source).unwrap();
        DownloadLedger::load(&layout, &source).unwrap()
    }

    #[test]
    fn test_new_supported_item_proceeds() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger = empty_ledger(&tmp);
        let decision = classify(&item("https://fs.test/20/a.doc"), &ledger, &WORD_FORMATS);
        assert_eq!(decision, Decision::Proceed);
    }

    #[test]
    fn test_uppercase_suffix_is_accepted() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger = empty_ledger(&tmp);
        let decision = classify(&item("https://fs.test/20/a.DOCX"), &ledger, &WORD_FORMATS);
        assert_eq!(decision, Decision::Proceed);
    }

    #[test]
    fn test_unsupported_format_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger = empty_ledger(&tmp);
        let decision = classify(&item("https://fs.test/20/a.pdf"), &ledger, &WORD_FORMATS);
        assert_eq!(decision, Decision::SkipUnsupportedFormat);
    }

    #[test]
    fn test_already_downloaded_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let mut ledger = empty_ledger(&tmp);
        ledger.record_downloaded("a.doc");
        let decision = classify(&item("https://fs.test/20/a.doc"), &ledger, &WORD_FORMATS);
        assert_eq!(decision, Decision::SkipAlreadyDownloaded);
    }

    #[test]
    fn test_corrupt_item_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let mut ledger = empty_ledger(&tmp);
        ledger.mark_corrupt("a.doc");
        let decision = classify(&item("https://fs.test/20/a.doc"), &ledger, &WORD_FORMATS);
        assert_eq!(decision, Decision::SkipCorrupt);
    }

    #[test]
    fn test_already_downloaded_wins_over_corrupt() {
        let tmp = tempfile::tempdir().unwrap();
        let mut ledger = empty_ledger(&tmp);
        ledger.record_downloaded("a.doc");
        ledger.mark_corrupt("a.doc");
        let decision = classify(&item("https://fs.test/20/a.doc"), &ledger, &WORD_FORMATS);
        assert_eq!(decision, Decision::SkipAlreadyDownloaded);
    }

    #[test]
    fn test_already_downloaded_wins_over_unsupported_format() {
        // An artifact from a run before the whitelist changed still reads
        // as already downloaded, not as an unsupported format.
        let tmp = tempfile::tempdir().unwrap();
        let mut ledger = empty_ledger(&tmp);
        ledger.record_downloaded("a.rtf");
        let decision = classify(&item("https://fs.test/20/a.rtf"), &ledger, &WORD_FORMATS);
        assert_eq!(decision, Decision::SkipAlreadyDownloaded);
    }

    #[test]
    fn test_corrupt_unsupported_item_reports_format_first() {
        let tmp = tempfile::tempdir().unwrap();
        let mut ledger = empty_ledger(&tmp);
        ledger.mark_corrupt("a.pdf");
        let decision = classify(&item("https://fs.test/20/a.pdf"), &ledger, &WORD_FORMATS);
        assert_eq!(decision, Decision::SkipUnsupportedFormat);
    }
}
