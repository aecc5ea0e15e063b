//! XML chunker: a hand-rolled byte-level tag scanner over direct children
//! of the root element (no DOM), preserving exact source byte extents so
//! attributes and mixed content round-trip verbatim into chunk content.

use crate::cancel::CancellationToken;
use crate::chunk::{Chunk, ChunkResult};
use crate::chunker::splitter::split_oversized;
use crate::chunker::{matches_extension, Chunker};
use crate::error::{ChunkError, ChunkWarning};
use crate::metadata::{ChunkMetadata, StructuredMetadata};
use crate::options::ChunkOptions;
use crate::tokenizer::count_tokens;

const EXTENSIONS: &[&str] = &[".xml"];

/// One direct child element of the XML root, with its exact byte extent.
struct ChildSpan {
    name: String,
    start: usize,
    end: usize,
}

/// Splits XML into one chunk per direct child of the root element.
#[derive(Debug, Default)]
pub struct XmlChunker;

impl XmlChunker {
    pub fn new() -> Self {
        Self
    }
}

/// Scan `text` for the root element's direct children, returning their
/// name and exact `[start, end)` byte span (including open/close tags).
/// Tracks nested-tag depth so nested elements are not mistaken for siblings,
/// and respects quoting inside attribute values so a `>` in a string never
/// confuses tag-end detection.
fn scan_children(text: &str) -> Result<(String, Vec<ChildSpan>), String> {
    let bytes = text.as_bytes();
    let mut i = 0usize;
    let mut root_name: Option<String> = None;
    let mut root_depth = 0i32;
    let mut children = Vec::new();
    let mut pending_child: Option<(String, usize)> = None;
    let mut child_depth = 0i32;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        let tag_start = i;
        let tag_end = find_tag_end(bytes, i).ok_or("unterminated tag")?;
        let tag_text = &text[tag_start..=tag_end];

        if tag_text.starts_with("<?") || tag_text.starts_with("<!--") || tag_text.starts_with("<!") {
            i = tag_end + 1;
            continue;
        }

        let is_closing = tag_text.starts_with("</");
        let is_self_closing = tag_text.ends_with("/>");
        let name = tag_name(tag_text, is_closing);

        if root_name.is_none() && !is_closing {
            root_name = Some(name.clone());
            root_depth = 1;
            i = tag_end + 1;
            continue;
        }

        if let Some(root) = &root_name {
            if pending_child.is_none() {
                if is_closing && name == *root {
                    root_depth -= 1;
                    i = tag_end + 1;
                    continue;
                }
                if !is_closing {
                    if is_self_closing {
                        children.push(ChildSpan {
                            name,
                            start: tag_start,
                            end: tag_end + 1,
                        });
                    } else {
                        pending_child = Some((name, tag_start));
                        child_depth = 1;
                    }
                }
            } else {
                if !is_closing && !is_self_closing {
                    child_depth += 1;
                } else if is_closing {
                    child_depth -= 1;
                    if child_depth == 0 {
                        let (child_name, start) = pending_child.take().unwrap();
                        children.push(ChildSpan {
                            name: child_name,
                            start,
                            end: tag_end + 1,
                        });
                    }
                }
            }
        }
        i = tag_end + 1;
    }

    let root = root_name.ok_or("no root element found")?;
    if root_depth != 0 {
        return Err("root element not closed".to_string());
    }
    Ok((root, children))
}

fn find_tag_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start;
    let mut in_quote: Option<u8> = None;
    while i < bytes.len() {
        let b = bytes[i];
        match in_quote {
            Some(q) => {
                if b == q {
                    in_quote = None;
                }
            }
            None => {
                if b == b'"' || b == b'\'' {
                    in_quote = Some(b);
                } else if b == b'>' {
                    return Some(i);
                }
            }
        }
        i += 1;
    }
    None
}

fn tag_name(tag_text: &str, is_closing: bool) -> String {
    let inner = tag_text.trim_start_matches('<').trim_end_matches('>').trim_end_matches('/');
    let inner = if is_closing {
        inner.trim_start_matches('/')
    } else {
        inner
    };
    inner
        .split(|c: char| c.is_whitespace())
        .next()
        .unwrap_or("")
        .to_string()
}

impl Chunker for XmlChunker {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn priority(&self) -> i32 {
        25
    }

    fn can_handle(&self, mime: Option<&str>, language_hint: Option<&str>) -> bool {
        if let Some(mime) = mime {
            if mime.eq_ignore_ascii_case("application/xml") || mime.eq_ignore_ascii_case("text/xml") {
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
        let text = String::from_utf8_lossy(content);
        let mut warnings: Vec<ChunkWarning> = Vec::new();

        let (root, children) = match scan_children(&text) {
            Ok(v) => v,
            Err(msg) => {
                warnings.push(ChunkWarning::new(0, format!("failed to parse XML: {msg}"), "XML_PARSE_ERROR"));
                let token_estimate = count_tokens(&text);
                let chunk = Chunk {
                    index: 0,
                    start_offset: 0,
                    end_offset: content.len(),
                    content: text.into_owned(),
                    metadata: ChunkMetadata::structured(token_estimate, StructuredMetadata::default()),
                };
                return Ok(ChunkResult::new(vec![chunk], warnings, self.name(), content.len()));
            }
        };

        let mut chunks = Vec::new();
        for child in &children {
            if cancel.is_cancelled() {
                return Err(ChunkError::Cancelled);
            }
            let element_text = &text[child.start..child.end];
            let meta = StructuredMetadata {
                element_name: Some(child.name.clone()),
                element_path: Some(format!("/{root}/{}", child.name)),
                ..Default::default()
            };
            let pieces = split_oversized(
                element_text,
                options.max_chunk_size,
                options.overlap,
                child.start,
                &mut warnings,
            );
            for piece in pieces {
                let token_estimate = count_tokens(&piece.content);
                chunks.push(Chunk {
                    index: 0,
                    start_offset: piece.start_in_unit,
                    end_offset: piece.end_in_unit,
                    content: piece.content,
                    metadata: ChunkMetadata::structured(token_estimate, meta.clone()),
                });
            }
        }

        for (i, chunk) in chunks.iter_mut().enumerate() {
            chunk.index = i;
        }

        Ok(ChunkResult::new(chunks, warnings, self.name(), content.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_handle_xml_extension() {
        let c = XmlChunker::new();
        assert!(c.can_handle(None, Some("data.xml")));
    }

    #[test]
    fn one_chunk_per_direct_child() {
        let c = XmlChunker::new();
        let text = "<root><a>1</a><b>2</b></root>";
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 2);
    }

    #[test]
    fn self_closing_child_is_one_chunk() {
        let c = XmlChunker::new();
        let text = "<root><item id=\"1\"/><item id=\"2\"/></root>";
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 2);
    }

    #[test]
    fn angle_bracket_inside_attribute_value_does_not_confuse_scanner() {
        let c = XmlChunker::new();
        let text = "<root><a note=\"1 &gt; 0\">x</a></root>";
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 1);
    }

    #[test]
    fn malformed_xml_degrades_to_single_chunk() {
        let c = XmlChunker::new();
        let text = "<root><a>unterminated";
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 1);
        assert!(result.warnings.iter().any(|w| w.code == "XML_PARSE_ERROR"));
    }
}
