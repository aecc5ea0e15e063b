//! reStructuredText sectionizer
//!
//! Heading detection: a text line immediately followed by an underline
//! line at least as long as the text, built from a single repeated
//! character drawn from the RST adornment set. The first adornment
//! character encountered is assigned level 1, the next previously-unseen
//! character level 2, and so on.

use super::{sections_to_chunks, HeadingStack};
use crate::cancel::CancellationToken;
use crate::chunk::ChunkResult;
use crate::chunker::{matches_extension, Chunker};
use crate::error::ChunkError;
use crate::metadata::ContentKind;
use crate::options::ChunkOptions;

const EXTENSIONS: &[&str] = &[".rst", ".rest"];
const ADORNMENTS: &str = "=-~^\"'+`#*:._";

/// Splits RST along underlined-heading boundaries.
#[derive(Debug, Default)]
pub struct RstChunker;

impl RstChunker {
    pub fn new() -> Self {
        Self
    }
}

fn is_adornment_line(line: &str) -> Option<char> {
    let trimmed = line.trim_end_matches(['\n', '\r']);
    if trimmed.is_empty() {
        return None;
    }
    let first = trimmed.chars().next().unwrap();
    if !ADORNMENTS.contains(first) {
        return None;
    }
    if trimmed.chars().all(|c| c == first) {
        Some(first)
    } else {
        None
    }
}

impl Chunker for RstChunker {
    fn name(&self) -> &'static str {
        "rst"
    }

    fn priority(&self) -> i32 {
        52
    }

    fn can_handle(&self, mime: Option<&str>, language_hint: Option<&str>) -> bool {
        if let Some(mime) = mime {
            if mime.eq_ignore_ascii_case("text/x-rst") {
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
        let mut levels: Vec<char> = Vec::new();

        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let mut i = 0usize;
        let mut pending_heading: Option<(usize, usize)> = None;

        while i < lines.len() {
            if cancel.is_cancelled() {
                return Err(ChunkError::Cancelled);
            }
            let line = lines[i];
            let text_trimmed = line.trim_end_matches(['\n', '\r']);

            if let Some(adorn) = is_adornment_line(line) {
                if let Some((start, end)) = pending_heading.take() {
                    let heading_text: String = lines[start..end].concat();
                    let heading_text = heading_text.trim_end_matches(['\n', '\r']);
                    if text_trimmed.len() >= heading_text.trim().len() && !heading_text.trim().is_empty()
                    {
                        let level = match levels.iter().position(|&c| c == adorn) {
                            Some(pos) => (pos + 1) as u8,
                            None => {
                                levels.push(adorn);
                                levels.len() as u8
                            }
                        };
                        let heading_block: String =
                            lines[start..=i].concat();
                        stack.start_heading(heading_text.trim(), level, &heading_block);
                        i += 1;
                        continue;
                    }
                }
                stack.push_text(line);
                i += 1;
                continue;
            }

            if let Some((start, _)) = pending_heading {
                // previous candidate line wasn't a heading after all.
                for l in &lines[start..i] {
                    stack.push_text(l);
                }
            }
            if !text_trimmed.trim().is_empty()
                && i + 1 < lines.len()
                && is_adornment_line(lines[i + 1]).is_some()
            {
                pending_heading = Some((i, i + 1));
            } else {
                pending_heading = None;
                stack.push_text(line);
            }
            i += 1;
        }
        if let Some((start, _)) = pending_heading {
            for l in &lines[start..] {
                stack.push_text(l);
            }
        }

        let sections = stack.finish();
        let chunks = sections_to_chunks(sections, ContentKind::Prose, options, &mut warnings);

        Ok(ChunkResult::new(chunks, warnings, self.name(), content.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_handle_rst_extension() {
        let c = RstChunker::new();
        assert!(c.can_handle(None, Some("index.rst")));
    }

    #[test]
    fn underline_heading_detected() {
        let c = RstChunker::new();
        let text = "Title\n=====\n\nBody text here.\n";
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 1);
    }

    #[test]
    fn first_and_second_adornment_get_distinct_levels() {
        let c = RstChunker::new();
        let text = "Chapter\n=======\n\nSection\n-------\n\nbody\n";
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert!(result.total_chunks >= 1);
    }
}
