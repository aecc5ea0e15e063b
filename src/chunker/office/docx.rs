//! DOCX chunker: ZIP -> `word/document.xml` -> paragraph/heading/table
//! extraction

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::zip_util::{read_entry, read_entry_optional};
use crate::cancel::CancellationToken;
use crate::chunk::ChunkResult;
use crate::chunker::prose::{sections_to_chunks, HeadingStack};
use crate::chunker::Chunker;
use crate::error::ChunkError;
use crate::metadata::ContentKind;
use crate::options::ChunkOptions;

const EXTENSIONS: &[&str] = &[".docx"];

/// Splits a DOCX container along heading boundaries, consulting
/// `word/styles.xml` for `pStyle` -> outline-level mapping; tables become
/// CSV text inline.
#[derive(Debug, Default)]
pub struct DocxChunker;

impl DocxChunker {
    pub fn new() -> Self {
        Self
    }
}

/// Map each paragraph style id to its outline level (0-indexed), parsed
/// from `word/styles.xml`'s `<w:style><w:pPr><w:outlineLvl w:val="N"/>`.
fn parse_outline_levels(styles_xml: &str) -> HashMap<String, u8> {
    let mut map = HashMap::new();
    let mut reader = Reader::from_str(styles_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut current_style_id: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = e.name();
                let local = String::from_utf8_lossy(name.as_ref()).into_owned();
                if local.ends_with("style") {
                    for attr in e.attributes().flatten() {
                        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                        if key.ends_with("styleId") {
                            current_style_id = attr.unescape_value().ok().map(|v| v.into_owned());
                        }
                    }
                } else if local.ends_with("outlineLvl") {
                    if let Some(style_id) = &current_style_id {
                        for attr in e.attributes().flatten() {
                            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                            if key.ends_with(":val") || key == "val" {
                                if let Ok(val) = attr.unescape_value() {
                                    if let Ok(level) = val.parse::<u8>() {
                                        map.insert(style_id.clone(), level);
                                    }
                                }
                            }
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                let local = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if local.ends_with("style") {
                    current_style_id = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    map
}

struct Paragraph {
    style_id: Option<String>,
    text: String,
}

struct Table {
    rows: Vec<Vec<String>>,
}

enum BodyItem {
    Paragraph(Paragraph),
    Table(Table),
}

/// Stream `word/document.xml`'s body into an ordered list of paragraphs
/// and tables.
fn parse_document(document_xml: &str) -> Vec<BodyItem> {
    let mut reader = Reader::from_str(document_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut items = Vec::new();

    let mut in_paragraph = false;
    let mut in_run_text = false;
    let mut para_text = String::new();
    let mut para_style: Option<String> = None;

    let mut in_table = false;
    let mut table_rows: Vec<Vec<String>> = Vec::new();
    let mut in_row = false;
    let mut current_row: Vec<String> = Vec::new();
    let mut in_cell = false;
    let mut cell_text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let local = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if local.ends_with("tbl") {
                    in_table = true;
                    table_rows.clear();
                } else if in_table && local.ends_with("tr") {
                    in_row = true;
                    current_row.clear();
                } else if in_table && local.ends_with("tc") {
                    in_cell = true;
                    cell_text.clear();
                } else if local.ends_with(":p") || local == "p" {
                    in_paragraph = true;
                    para_text.clear();
                    para_style = None;
                } else if in_paragraph && local.ends_with("pStyle") {
                    for attr in e.attributes().flatten() {
                        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                        if key.ends_with(":val") || key == "val" {
                            para_style = attr.unescape_value().ok().map(|v| v.into_owned());
                        }
                    }
                } else if in_paragraph && local.ends_with(":t") || local == "t" {
                    in_run_text = true;
                } else if local.ends_with("tab") {
                    if in_cell {
                        cell_text.push('\t');
                    } else if in_paragraph {
                        para_text.push('\t');
                    }
                } else if local.ends_with("br") {
                    if in_cell {
                        cell_text.push('\n');
                    } else if in_paragraph {
                        para_text.push('\n');
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if in_run_text {
                    let text = t.unescape().unwrap_or_default().into_owned();
                    if in_cell {
                        cell_text.push_str(&text);
                    } else {
                        para_text.push_str(&text);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let local = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if local.ends_with("tbl") {
                    in_table = false;
                    items.push(BodyItem::Table(Table {
                        rows: std::mem::take(&mut table_rows),
                    }));
                } else if local.ends_with("tr") {
                    in_row = false;
                    table_rows.push(std::mem::take(&mut current_row));
                } else if local.ends_with("tc") {
                    in_cell = false;
                    current_row.push(std::mem::take(&mut cell_text));
                } else if (local.ends_with(":t") || local == "t") && in_paragraph {
                    in_run_text = false;
                } else if local.ends_with("p") && !local.ends_with("tcPr") && in_paragraph && !in_table {
                    in_paragraph = false;
                    items.push(BodyItem::Paragraph(Paragraph {
                        style_id: para_style.take(),
                        text: std::mem::take(&mut para_text),
                    }));
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    let _ = in_row;
    items
}

fn render_table_csv(table: &Table) -> String {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    for row in &table.rows {
        let _ = writer.write_record(row);
    }
    let bytes = writer.into_inner().unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

impl Chunker for DocxChunker {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn priority(&self) -> i32 {
        72
    }

    fn can_handle(&self, mime: Option<&str>, language_hint: Option<&str>) -> bool {
        if let Some(mime) = mime {
            if mime.eq_ignore_ascii_case(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            ) {
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
        let document_xml = read_entry(content, "word/document.xml")?;
        let outline_levels = read_entry_optional(content, "word/styles.xml")
            .map(|s| parse_outline_levels(&s))
            .unwrap_or_default();

        let items = parse_document(&document_xml);
        let mut stack = HeadingStack::new();
        let mut warnings = Vec::new();

        for item in items {
            if cancel.is_cancelled() {
                return Err(ChunkError::Cancelled);
            }
            match item {
                BodyItem::Paragraph(p) => {
                    let level = p.style_id.as_ref().and_then(|id| outline_levels.get(id));
                    match level {
                        Some(level) => {
                            let heading_line = format!("{}\n", p.text.trim());
                            stack.start_heading(p.text.trim(), level + 1, &heading_line);
                        }
                        None => {
                            stack.push_text(&p.text);
                            stack.push_text("\n");
                        }
                    }
                }
                BodyItem::Table(table) => {
                    let csv_text = render_table_csv(&table);
                    stack.mark_table();
                    stack.push_text(&csv_text);
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
    fn can_handle_docx_extension() {
        let c = DocxChunker::new();
        assert!(c.can_handle(None, Some("report.docx")));
    }

    #[test]
    fn non_zip_input_is_container_invalid() {
        let c = DocxChunker::new();
        let err = c
            .chunk(b"not a zip", &ChunkOptions::default(), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, ChunkError::ContainerInvalid(_)));
    }

    #[test]
    fn parses_outline_levels_from_styles_xml() {
        let styles = r#"<w:styles xmlns:w="ns"><w:style w:styleId="Heading1"><w:pPr><w:outlineLvl w:val="0"/></w:pPr></w:style></w:styles>"#;
        let levels = parse_outline_levels(styles);
        assert_eq!(levels.get("Heading1"), Some(&0));
    }

    #[test]
    fn renders_table_rows_as_csv() {
        let table = Table {
            rows: vec![vec!["a".to_string(), "b,c".to_string()]],
        };
        let csv_text = render_table_csv(&table);
        assert!(csv_text.contains("\"b,c\""));
    }
}
