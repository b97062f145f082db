//! OOXML `.docx` text extraction.
//!
//! A `.docx` file is a zip archive; the document body lives in
//! `word/document.xml`. Text runs sit in `<w:t>` elements, including runs
//! inside text boxes (`<w:txbxContent>`), which older scanned documents use
//! for OCR output. Paragraph ends become newlines so word counting matches
//! what a reader would see.
//!
//! Legacy binary `.doc` files are not OOXML and are reported as unsupported
//! by [`handles`](super::TextExtractor::handles), not as corrupt.

use std::io::Read;
use std::path::Path;

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::Event;

use super::{ExtractError, TextExtractor};

/// Archive member holding the document body.
const DOCUMENT_PART: &str = "word/document.xml";

/// Extracts plain text from OOXML word-processor documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor;

impl DocxExtractor {
    /// Creates the extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for DocxExtractor {
    fn handles(&self, suffix: &str) -> bool {
        suffix.eq_ignore_ascii_case("docx")
    }

    async fn extract(&mut self, path: &Path) -> Result<String, ExtractError> {
        read_docx_text(path)
    }
}

/// Opens the archive and collects the document body's text runs.
fn read_docx_text(path: &Path) -> Result<String, ExtractError> {
    let file = std::fs::File::open(path).map_err(|e| ExtractError::io(path, e))?;

    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| ExtractError::corrupt(path, e.to_string()))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractError::corrupt(path, format!("missing {DOCUMENT_PART}: {e}")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| ExtractError::corrupt(path, format!("unreadable {DOCUMENT_PART}: {e}")))?;

    document_text(&xml).map_err(|reason| ExtractError::corrupt(path, reason))
}

/// Walks the document XML and joins text runs, paragraph by paragraph.
fn document_text(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:br" => out.push('\n'),
                b"w:tab" => out.push('\t'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let text = t.unescape().map_err(|e| e.to_string())?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            Ok(_) => {}
        }
    }

    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Builds a minimal valid docx archive around the given document body.
    fn docx_bytes(document_xml: &str) -> Vec<u8> {
        let mut buffer = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file(DOCUMENT_PART, options).unwrap();
            writer.write_all(document_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }

    fn write_docx(dir: &Path, name: &str, document_xml: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, docx_bytes(document_xml)).unwrap();
        path
    }

    const SIMPLE_BODY: &str = r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>
    <w:p><w:r><w:t>Second</w:t></w:r><w:r><w:t xml:space="preserve"> paragraph.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[tokio::test]
    async fn test_extracts_paragraph_text() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_docx(tmp.path(), "bill.docx", SIMPLE_BODY);

        let mut extractor = DocxExtractor::new();
        let text = extractor.extract(&path).await.unwrap();

        assert!(text.contains("First paragraph."));
        assert!(text.contains("Second paragraph."));
        assert_eq!(text.split_whitespace().count(), 4);
    }

    #[tokio::test]
    async fn test_text_box_runs_are_collected() {
        let body = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Body text.</w:t></w:r></w:p>
    <w:txbxContent>
      <w:p><w:r><w:t>OCR text box.</w:t></w:r></w:p>
    </w:txbxContent>
  </w:body>
</w:document>"#;
        let tmp = tempfile::tempdir().unwrap();
        let path = write_docx(tmp.path(), "scanned.docx", body);

        let mut extractor = DocxExtractor::new();
        let text = extractor.extract(&path).await.unwrap();

        assert!(text.contains("Body text."));
        assert!(text.contains("OCR text box."));
    }

    #[tokio::test]
    async fn test_non_zip_bytes_are_corrupt() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.docx");
        std::fs::write(&path, b"not a zip archive at all").unwrap();

        let mut extractor = DocxExtractor::new();
        let result = extractor.extract(&path).await;

        assert!(matches!(result, Err(ExtractError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_archive_without_document_part_is_corrupt() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("odd.docx");
        let mut buffer = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file("other/part.xml", options).unwrap();
            writer.write_all(b"<x/>").unwrap();
            writer.finish().unwrap();
        }
        std::fs::write(&path, buffer.into_inner()).unwrap();

        let mut extractor = DocxExtractor::new();
        let result = extractor.extract(&path).await;

        assert!(matches!(result, Err(ExtractError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("absent.docx");

        let mut extractor = DocxExtractor::new();
        let result = extractor.extract(&path).await;

        assert!(matches!(result, Err(ExtractError::Io { .. })));
    }

    #[test]
    fn test_handles_docx_only() {
        let extractor = DocxExtractor::new();
        assert!(extractor.handles("docx"));
        assert!(extractor.handles("DOCX"));
        assert!(!extractor.handles("doc"));
        assert!(!extractor.handles("pdf"));
    }
}
