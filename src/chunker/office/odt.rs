//! ODT chunker: ZIP -> `content.xml` -> paragraph/heading/table extraction

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::zip_util::read_entry;
use crate::cancel::CancellationToken;
use crate::chunk::ChunkResult;
use crate::chunker::prose::{sections_to_chunks, HeadingStack};
use crate::chunker::Chunker;
use crate::error::ChunkError;
use crate::metadata::ContentKind;
use crate::options::ChunkOptions;

const EXTENSIONS: &[&str] = &[".odt"];

/// Splits an ODT container along `text:h` heading boundaries, reading
/// `text:outline-level` directly (no separate style sheet lookup, unlike
/// DOCX).
#[derive(Debug, Default)]
pub struct OdtChunker;

impl OdtChunker {
    pub fn new() -> Self {
        Self
    }
}

enum ContentItem {
    Heading { level: u8, text: String },
    Paragraph(String),
    TableRow(Vec<String>),
    TableEnd,
}

fn parse_content(content_xml: &str) -> Vec<ContentItem> {
    let mut reader = Reader::from_str(content_xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut items = Vec::new();

    let mut in_heading = false;
    let mut heading_level: u8 = 1;
    let mut in_paragraph = false;
    let mut text_buf = String::new();

    let mut in_table_row = false;
    let mut current_row: Vec<String> = Vec::new();
    let mut in_table_cell = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let local = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if local.ends_with(":h") || local == "h" {
                    in_heading = true;
                    text_buf.clear();
                    heading_level = 1;
                    for attr in e.attributes().flatten() {
                        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                        if key.ends_with("outline-level") {
                            if let Ok(val) = attr.unescape_value() {
                                heading_level = val.parse().unwrap_or(1);
                            }
                        }
                    }
                } else if local.ends_with(":p") || local == "p" {
                    in_paragraph = true;
                    text_buf.clear();
                } else if local.ends_with("table-row") {
                    in_table_row = true;
                    current_row.clear();
                } else if local.ends_with("table-cell") {
                    in_table_cell = true;
                    text_buf.clear();
                } else if local.ends_with(":tab") || local == "tab" {
                    text_buf.push('\t');
                } else if local.ends_with("line-break") {
                    text_buf.push('\n');
                } else if local.ends_with(":s") || local == "s" {
                    text_buf.push(' ');
                }
            }
            Ok(Event::Text(t)) => {
                if in_heading || in_paragraph || in_table_cell {
                    text_buf.push_str(&t.unescape().unwrap_or_default());
                }
            }
            Ok(Event::End(e)) => {
                let local = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if local.ends_with(":h") || local == "h" {
                    in_heading = false;
                    items.push(ContentItem::Heading {
                        level: heading_level,
                        text: std::mem::take(&mut text_buf),
                    });
                } else if (local.ends_with(":p") || local == "p") && in_paragraph && !in_table_cell {
                    in_paragraph = false;
                    items.push(ContentItem::Paragraph(std::mem::take(&mut text_buf)));
                } else if local.ends_with("table-cell") {
                    in_table_cell = false;
                    current_row.push(std::mem::take(&mut text_buf));
                } else if local.ends_with("table-row") {
                    in_table_row = false;
                    items.push(ContentItem::TableRow(std::mem::take(&mut current_row)));
                } else if local.ends_with("table") && !local.ends_with("table-row") && !local.ends_with("table-cell") {
                    items.push(ContentItem::TableEnd);
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    let _ = in_table_row;
    items
}

fn render_rows_csv(rows: &[Vec<String>]) -> String {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    for row in rows {
        let _ = writer.write_record(row);
    }
    let bytes = writer.into_inner().unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

impl Chunker for OdtChunker {
    fn name(&self) -> &'static str {
        "odt"
    }

    fn priority(&self) -> i32 {
        71
    }

    fn can_handle(&self, mime: Option<&str>, language_hint: Option<&str>) -> bool {
        if let Some(mime) = mime {
            if mime.eq_ignore_ascii_case("application/vnd.oasis.opendocument.text") {
                return true;
            }
        }
        language_hint.is_some_and(|hint| crate::chunker::matches_extension(hint, EXTENSIONS))
    }

    fn chunk(
        &self,
        content: &[u8],
        options: &ChunkOptions,
        cancel: &CancellationToken,
    ) -> Result<ChunkResult, ChunkError> {
        let content_xml = read_entry(content, "content.xml")?;
        let items = parse_content(&content_xml);
        let mut stack = HeadingStack::new();
        let mut warnings = Vec::new();
        let mut pending_rows: Vec<Vec<String>> = Vec::new();

        for item in items {
            if cancel.is_cancelled() {
                return Err(ChunkError::Cancelled);
            }
            match item {
                ContentItem::Heading { level, text } => {
                    let heading_line = format!("{}\n", text.trim());
                    stack.start_heading(text.trim(), level, &heading_line);
                }
                ContentItem::Paragraph(text) => {
                    stack.push_text(&text);
                    stack.push_text("\n");
                }
                ContentItem::TableRow(row) => pending_rows.push(row),
                ContentItem::TableEnd => {
                    if !pending_rows.is_empty() {
                        let csv_text = render_rows_csv(&pending_rows);
                        stack.mark_table();
                        stack.push_text(&csv_text);
                        pending_rows.clear();
                    }
                }
            }
        }

        let sections = stack.finish();
        let chunks = sections_to_chunks(sections, ContentKind::Markdown, options, &mut warnings);

        Ok(ChunkResult::new(chunks, warnings, self.name(), content.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_handle_odt_extension() {
        let c = OdtChunker::new();
        assert!(c.can_handle(None, Some("report.odt")));
    }

    #[test]
    fn non_zip_input_is_container_invalid() {
        let c = OdtChunker::new();
        let err = c
            .chunk(b"not a zip", &ChunkOptions::default(), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, ChunkError::ContainerInvalid(_)));
    }

    #[test]
    fn parses_heading_outline_level() {
        let xml = r#"<office:body><office:text><text:h text:outline-level="2">Title</text:h></office:text></office:body>"#;
        let items = parse_content(xml);
        assert!(matches!(items[0], ContentItem::Heading { level: 2, .. }));
    }
}
