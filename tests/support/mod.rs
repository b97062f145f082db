//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::io::Write;

use serde_json::{Value, json};

/// Builds a minimal valid docx archive whose body is one paragraph of
/// `text`.
pub fn docx_bytes(text: &str) -> Vec<u8> {
    let document_xml = format!(
        r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:body>
</w:document>"#
    );

    let mut buffer = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buffer);
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap();
    }
    buffer.into_inner()
}

/// Builds an OData page body for `table` listing the given file URLs.
pub fn catalog_page(table: &str, file_urls: &[&str], next_link: Option<&str>) -> Value {
    let mut body = json!({
        "odata.metadata": format!("http://odata.test/svc/$metadata#{table}"),
        "value": file_urls.iter().map(|url| json!({"FilePath": url})).collect::<Vec<_>>(),
    });
    if let Some(next_link) = next_link {
        body["odata.nextLink"] = json!(next_link);
    }
    body
}
