//! DOCX/ODT chunkers against minimal hand-built ZIP archives, exercising
//! the full container -> XML -> section pipeline end to end.

use std::io::Write;

use chunk_engine::{CancellationToken, ChunkOptions, ChunkerRegistry};
use zip::write::SimpleFileOptions;

fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        let options = SimpleFileOptions::default();
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }
    buf
}

const DOCUMENT_XML: &str = r#"<?xml version="1.0"?>
<w:document xmlns:w="ns">
  <w:body>
    <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Introduction</w:t></w:r></w:p>
    <w:p><w:r><w:t>Some introductory body text.</w:t></w:r></w:p>
    <w:tbl>
      <w:tr><w:tc><w:p><w:r><w:t>a</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>b</w:t></w:r></w:p></w:tc></w:tr>
    </w:tbl>
  </w:body>
</w:document>"#;

const STYLES_XML: &str = r#"<?xml version="1.0"?>
<w:styles xmlns:w="ns">
  <w:style w:styleId="Heading1"><w:pPr><w:outlineLvl w:val="0"/></w:pPr></w:style>
</w:styles>"#;

#[test]
fn docx_container_produces_heading_and_table_chunks() {
    let zip_bytes = build_zip(&[
        ("word/document.xml", DOCUMENT_XML),
        ("word/styles.xml", STYLES_XML),
    ]);
    let registry = ChunkerRegistry::default();
    let result = registry
        .chunk(
            &zip_bytes,
            &ChunkOptions::default(),
            None,
            Some("report.docx"),
            &CancellationToken::new(),
        )
        .unwrap();
    assert_eq!(result.chunker_used, "docx");
    assert!(!result.chunks.is_empty());
    let joined: String = result.chunks.iter().map(|c| c.content.as_str()).collect();
    assert!(joined.contains("Introduction"));
}

#[test]
fn docx_missing_document_xml_is_container_invalid() {
    let zip_bytes = build_zip(&[("word/styles.xml", STYLES_XML)]);
    let registry = ChunkerRegistry::default();
    let err = registry
        .chunk(&zip_bytes, &ChunkOptions::default(), None, Some("broken.docx"), &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, chunk_engine::ChunkError::ContainerInvalid(_)));
}

const ODT_CONTENT_XML: &str = r#"<?xml version="1.0"?>
<office:body xmlns:office="ns" xmlns:text="ns">
  <office:text>
    <text:h text:outline-level="1">Overview</text:h>
    <text:p>Body paragraph text.</text:p>
  </office:text>
</office:body>"#;

#[test]
fn odt_container_produces_heading_chunk() {
    let zip_bytes = build_zip(&[("content.xml", ODT_CONTENT_XML)]);
    let registry = ChunkerRegistry::default();
    let result = registry
        .chunk(&zip_bytes, &ChunkOptions::default(), None, Some("notes.odt"), &CancellationToken::new())
        .unwrap();
    assert_eq!(result.chunker_used, "odt");
    let joined: String = result.chunks.iter().map(|c| c.content.as_str()).collect();
    assert!(joined.contains("Overview"));
}
