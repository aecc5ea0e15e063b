//! AsciiDoc sectionizer

use super::{sections_to_chunks, HeadingStack};
use crate::cancel::CancellationToken;
use crate::chunk::ChunkResult;
use crate::chunker::{matches_extension, Chunker};
use crate::error::ChunkError;
use crate::metadata::ContentKind;
use crate::options::ChunkOptions;

const EXTENSIONS: &[&str] = &[".adoc", ".asciidoc", ".asc"];
const DELIMITERS: &[&str] = &["----", "....", "====", "****", "____", "|==="];

/// Splits AsciiDoc along `={1,6} ` heading lines, skipping lines inside
/// delimited blocks (listing, literal, example, sidebar, quote, table).
#[derive(Debug, Default)]
pub struct AsciiDocChunker;

impl AsciiDocChunker {
    pub fn new() -> Self {
        Self
    }
}

fn heading_level(line: &str) -> Option<(u8, &str)> {
    let trimmed = line.trim_end_matches(['\n', '\r']);
    let eq_count = trimmed.chars().take_while(|&c| c == '=').count();
    if eq_count == 0 || eq_count > 6 {
        return None;
    }
    let rest = &trimmed[eq_count..];
    if !rest.starts_with(' ') {
        return None;
    }
    Some((eq_count as u8, rest.trim_start()))
}

impl Chunker for AsciiDocChunker {
    fn name(&self) -> &'static str {
        "asciidoc"
    }

    fn priority(&self) -> i32 {
        55
    }

    fn can_handle(&self, mime: Option<&str>, language_hint: Option<&str>) -> bool {
        if let Some(mime) = mime {
            if mime.eq_ignore_ascii_case("text/asciidoc") {
                return true;
            }
        }
        language_hint.is_some_and(|hint| matches_extension(hint, EXTENSIONS))
    }

    fn chunk(
        &self,
        content: &[u8],
        options: &ChunkOptions,
        cancel: &CancellationToken,
    ) -> Result<ChunkResult, ChunkError> {
        let text = String::from_utf8_lossy(content).into_owned();
        let mut warnings = Vec::new();
        let mut stack = HeadingStack::new();
        let mut in_delimited: Option<&str> = None;
        let mut pending_anchor: Option<String> = None;

        for line in text.split_inclusive('\n') {
            if cancel.is_cancelled() {
                return Err(ChunkError::Cancelled);
            }
            let trimmed = line.trim_end_matches(['\n', '\r']);

            if let Some(delim) = in_delimited {
                stack.push_text(line);
                if trimmed == delim {
                    in_delimited = None;
                }
                continue;
            }
            if DELIMITERS.contains(&trimmed) {
                in_delimited = Some(trimmed);
                stack.push_text(line);
                continue;
            }

            if trimmed.starts_with("[[") && trimmed.ends_with("]]") {
                pending_anchor = Some(trimmed[2..trimmed.len() - 2].to_string());
                stack.push_text(line);
                continue;
            }

            if let Some((level, heading)) = heading_level(trimmed) {
                stack.start_heading(heading, level, line);
                pending_anchor = None;
                continue;
            }

            stack.push_text(line);
        }
        let _ = pending_anchor;

        let sections = stack.finish();
        let chunks = sections_to_chunks(sections, ContentKind::Prose, options, &mut warnings);

        Ok(ChunkResult::new(chunks, warnings, self.name(), content.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_handle_adoc_extension() {
        let c = AsciiDocChunker::new();
        assert!(c.can_handle(None, Some("guide.adoc")));
        assert!(!c.can_handle(None, Some("guide.md")));
    }

    #[test]
    fn heading_inside_listing_block_is_ignored() {
        let c = AsciiDocChunker::new();
        let text = "= Title\n\n----\n= not a heading\n----\n\nbody\n";
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 1);
    }

    #[test]
    fn detects_heading_level() {
        assert_eq!(heading_level("== Section"), Some((2, "Section")));
        assert_eq!(heading_level("======= too deep"), None);
        assert_eq!(heading_level("=not a heading"), None);
    }
}
