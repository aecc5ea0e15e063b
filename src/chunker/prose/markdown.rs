//! Markdown sectionizer, driven by `pulldown-cmark`'s event stream

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag};

use super::{sections_to_chunks, HeadingStack};
use crate::cancel::CancellationToken;
use crate::chunk::ChunkResult;
use crate::chunker::{matches_extension, Chunker};
use crate::error::ChunkError;
use crate::metadata::ContentKind;
use crate::options::ChunkOptions;

const EXTENSIONS: &[&str] = &[".md", ".markdown", ".mdown", ".mkd"];

/// Splits Markdown along heading boundaries detected via `pulldown-cmark`'s
/// event stream, so fenced or inline code never confuses the sectionizer.
#[derive(Debug, Default)]
pub struct MarkdownChunker;

impl MarkdownChunker {
    pub fn new() -> Self {
        Self
    }
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

impl Chunker for MarkdownChunker {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn priority(&self) -> i32 {
        60
    }

    fn can_handle(&self, mime: Option<&str>, language_hint: Option<&str>) -> bool {
        if let Some(mime) = mime {
            if mime.eq_ignore_ascii_case("text/markdown") {
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
        let parser_opts = Options::ENABLE_TABLES | Options::ENABLE_FOOTNOTES;
        let parser = Parser::new_ext(&text, parser_opts).into_offset_iter();

        let mut in_heading: Option<u8> = None;
        let mut heading_text = String::new();
        let mut last_offset = 0usize;

        for (event, range) in parser {
            if cancel.is_cancelled() {
                return Err(ChunkError::Cancelled);
            }
            match event {
                Event::Start(Tag::Heading(level, ..)) => {
                    in_heading = Some(heading_level_to_u8(level));
                    heading_text.clear();
                    last_offset = range.start;
                }
                Event::End(Tag::Heading(..)) => {
                    if let Some(level) = in_heading.take() {
                        let heading_line = &text[last_offset..range.end];
                        stack.start_heading(heading_text.trim(), level, heading_line);
                    }
                }
                Event::Text(t) | Event::Code(t) => {
                    if in_heading.is_some() {
                        heading_text.push_str(&t);
                    } else {
                        stack.push_text(&t);
                    }
                }
                Event::SoftBreak | Event::HardBreak => {
                    if in_heading.is_none() {
                        stack.push_text("\n");
                    }
                }
                _ => {}
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
    fn can_handle_md_extension() {
        let c = MarkdownChunker::new();
        assert!(c.can_handle(None, Some("README.md")));
        assert!(!c.can_handle(None, Some("README.txt")));
    }

    #[test]
    fn single_heading_produces_a_section() {
        let c = MarkdownChunker::new();
        let text = "# Title\n\nSome body text here.\n";
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 1);
    }

    #[test]
    fn fenced_code_heading_like_text_is_not_a_heading() {
        let c = MarkdownChunker::new();
        let text = "# Real Heading\n\n```\n# not a heading\n```\n";
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 1);
    }

    #[test]
    fn empty_content_yields_zero_chunks() {
        let c = MarkdownChunker::new();
        let result = c
            .chunk(b"", &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 0);
    }
}
