//! Routes downloaded documents to the extraction collaborator.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::{ExtractError, ExtractionOutcome, TextExtractor};

/// Errors of the dispatcher itself, distinct from extraction failures.
///
/// An extraction failure becomes [`ExtractionOutcome::CorruptSource`]; this
/// error means the dispatcher could not persist an artifact for a document
/// that extracted fine, and surfaces as a per-item failure.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The text artifact could not be written.
    #[error("IO error writing extracted text to {path}: {source}")]
    Artifact {
        /// The artifact path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Owns the extraction collaborator and turns downloaded files into `.txt`
/// artifacts.
pub struct ExtractionDispatcher {
    extractor: Box<dyn TextExtractor>,
}

impl std::fmt::Debug for ExtractionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionDispatcher").finish_non_exhaustive()
    }
}

impl ExtractionDispatcher {
    /// Wraps an extraction collaborator.
    #[must_use]
    pub fn new(extractor: Box<dyn TextExtractor>) -> Self {
        Self { extractor }
    }

    /// Extracts `file_name` (already downloaded into `documents_dir`) and,
    /// when text is found, writes `{file_name}.txt` into `texts_dir`.
    ///
    /// Unsupported formats are a no-op. Any extraction failure is reported
    /// as [`ExtractionOutcome::CorruptSource`], after which the extractor is
    /// asked to re-initialize its shared resource.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] only when a successfully extracted text
    /// cannot be persisted.
    #[instrument(skip(self, documents_dir, texts_dir))]
    pub async fn extract(
        &mut self,
        documents_dir: &Path,
        texts_dir: &Path,
        file_name: &str,
    ) -> Result<ExtractionOutcome, DispatchError> {
        let suffix = file_name
            .rsplit_once('.')
            .map(|(_, s)| s.to_ascii_lowercase())
            .unwrap_or_default();

        if !self.extractor.handles(&suffix) {
            debug!(file_name, suffix, "format not handled by extractor");
            return Ok(ExtractionOutcome::Unsupported);
        }

        let document_path = documents_dir.join(file_name);
        let text = match self.extractor.extract(&document_path).await {
            Ok(text) => text,
            Err(e) => {
                warn!(file_name, error = %e, "failed to open document, marking corrupt");
                self.extractor.reset().await;
                return Ok(ExtractionOutcome::CorruptSource);
            }
        };

        if text.trim().is_empty() {
            info!(file_name, "no text found in document");
            return Ok(ExtractionOutcome::EmptyText);
        }

        let word_count = text.split_whitespace().count() as u64;
        let artifact_path = texts_dir.join(format!("{file_name}.txt"));
        tokio::fs::write(&artifact_path, &text)
            .await
            .map_err(|e| DispatchError::Artifact {
                path: artifact_path.clone(),
                source: e,
            })?;

        info!(file_name, word_count, "document text extracted");
        Ok(ExtractionOutcome::Written(word_count))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted extractor: maps file names to canned results.
    #[derive(Default)]
    struct ScriptedExtractor {
        resets: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TextExtractor for ScriptedExtractor {
        fn handles(&self, suffix: &str) -> bool {
            suffix == "doc" || suffix == "docx"
        }

        async fn extract(&mut self, path: &Path) -> Result<String, ExtractError> {
            let name = path.file_name().unwrap().to_string_lossy();
            if name.starts_with("corrupt") {
                Err(ExtractError::corrupt(path, "scripted failure"))
            } else if name.starts_with("empty") {
                Ok("   \n".to_string())
            } else {
                Ok("one two three".to_string())
            }
        }

        async fn reset(&mut self) {
            self.resets.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn dirs() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("docs");
        let texts = tmp.path().join("texts");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::create_dir_all(&texts).unwrap();
        (tmp, docs, texts)
    }

    #[tokio::test]
    async fn test_written_outcome_persists_artifact_and_counts_words() {
        let (_tmp, docs, texts) = dirs();
        let mut dispatcher = ExtractionDispatcher::new(Box::new(ScriptedExtractor::default()));

        let outcome = dispatcher.extract(&docs, &texts, "bill_1.doc").await.unwrap();

        assert_eq!(outcome, ExtractionOutcome::Written(3));
        let artifact = std::fs::read_to_string(texts.join("bill_1.doc.txt")).unwrap();
        assert_eq!(artifact, "one two three");
    }

    #[tokio::test]
    async fn test_unsupported_format_is_a_no_op() {
        let (_tmp, docs, texts) = dirs();
        let mut dispatcher = ExtractionDispatcher::new(Box::new(ScriptedExtractor::default()));

        let outcome = dispatcher.extract(&docs, &texts, "video.wmv").await.unwrap();

        assert_eq!(outcome, ExtractionOutcome::Unsupported);
        assert_eq!(std::fs::read_dir(&texts).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_empty_text_writes_no_artifact() {
        let (_tmp, docs, texts) = dirs();
        let mut dispatcher = ExtractionDispatcher::new(Box::new(ScriptedExtractor::default()));

        let outcome = dispatcher.extract(&docs, &texts, "empty_1.docx").await.unwrap();

        assert_eq!(outcome, ExtractionOutcome::EmptyText);
        assert_eq!(std::fs::read_dir(&texts).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_source_triggers_extractor_reset() {
        let (_tmp, docs, texts) = dirs();
        let resets = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = ExtractionDispatcher::new(Box::new(ScriptedExtractor {
            resets: Arc::clone(&resets),
        }));

        let outcome = dispatcher
            .extract(&docs, &texts, "corrupt_1.doc")
            .await
            .unwrap();

        assert_eq!(outcome, ExtractionOutcome::CorruptSource);
        assert_eq!(resets.load(Ordering::SeqCst), 1);
        assert_eq!(std::fs::read_dir(&texts).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_file_without_suffix_is_unsupported() {
        let (_tmp, docs, texts) = dirs();
        let mut dispatcher = ExtractionDispatcher::new(Box::new(ScriptedExtractor::default()));

        let outcome = dispatcher.extract(&docs, &texts, "README").await.unwrap();
        assert_eq!(outcome, ExtractionOutcome::Unsupported);
    }
}
