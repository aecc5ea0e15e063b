//! HCL/Terraform chunker: one chunk per top-level block

use crate::cancel::CancellationToken;
use crate::chunk::{Chunk, ChunkResult};
use crate::chunker::splitter::split_oversized;
use crate::chunker::{matches_extension, Chunker};
use crate::error::{ChunkError, ChunkWarning};
use crate::metadata::{BlockType, ChunkMetadata, InfraMetadata};
use crate::options::ChunkOptions;
use crate::tokenizer::count_tokens;

const EXTENSIONS: &[&str] = &[".tf", ".tf.json", ".hcl"];
const BLOCK_KEYWORDS: &[&str] = &[
    "terraform", "provider", "variable", "output", "locals", "data", "resource", "module",
];

/// Splits HCL into one chunk per top-level block (`resource`, `data`,
/// `variable`, `output`, `module`, `provider`, `terraform`, `locals`).
#[derive(Debug, Default)]
pub struct HclChunker;

impl HclChunker {
    pub fn new() -> Self {
        Self
    }
}

fn block_type(keyword: &str) -> Option<BlockType> {
    match keyword {
        "resource" => Some(BlockType::Resource),
        "data" => Some(BlockType::Data),
        "variable" => Some(BlockType::Variable),
        "output" => Some(BlockType::Output),
        "module" => Some(BlockType::Module),
        "provider" => Some(BlockType::Provider),
        _ => None,
    }
}

struct BlockHeader {
    keyword: String,
    labels: Vec<String>,
    brace_start: usize,
}

fn parse_header(text: &str, keyword_start: usize) -> Option<BlockHeader> {
    let rest = &text[keyword_start..];
    let keyword_len = rest.find(char::is_whitespace)?;
    let keyword = rest[..keyword_len].to_string();
    if !BLOCK_KEYWORDS.contains(&keyword.as_str()) {
        return None;
    }
    let after_keyword = &rest[keyword_len..];
    let brace_rel = after_keyword.find('{')?;
    let header_text = &after_keyword[..brace_rel];
    let labels: Vec<String> = header_text
        .split('"')
        .enumerate()
        .filter_map(|(i, s)| if i % 2 == 1 { Some(s.to_string()) } else { None })
        .collect();
    Some(BlockHeader {
        keyword,
        labels,
        brace_start: keyword_start + keyword_len + brace_rel,
    })
}

fn find_matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == b'"' {
                in_string = false;
            }
        } else {
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    None
}

/// True when `pos` sits at the start of a line, ignoring leading whitespace
/// (a best-effort check that we're at top-level, not nested in a block).
fn at_line_start_keyword(text: &str, pos: usize) -> bool {
    text[..pos].rfind('\n').map(|nl| text[nl + 1..pos].trim().is_empty()).unwrap_or(text[..pos].trim().is_empty())
}

impl Chunker for HclChunker {
    fn name(&self) -> &'static str {
        "hcl"
    }

    fn priority(&self) -> i32 {
        43
    }

    fn can_handle(&self, mime: Option<&str>, language_hint: Option<&str>) -> bool {
        if let Some(mime) = mime {
            if mime.eq_ignore_ascii_case("application/x-hcl") || mime.eq_ignore_ascii_case("text/x-hcl") {
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
        let bytes = text.as_bytes();
        let mut warnings: Vec<ChunkWarning> = Vec::new();
        let mut chunks = Vec::new();

        let mut i = 0usize;
        let mut had_parse_error = false;
        while i < text.len() {
            if cancel.is_cancelled() {
                return Err(ChunkError::Cancelled);
            }
            let Some(rel) = text[i..].find(char::is_alphabetic) else {
                break;
            };
            let candidate_start = i + rel;
            if !at_line_start_keyword(&text, candidate_start) {
                let Some(next) = text[candidate_start..].find('\n') else {
                    break;
                };
                i = candidate_start + next + 1;
                continue;
            }
            match parse_header(&text, candidate_start) {
                Some(header) => match find_matching_brace(bytes, header.brace_start) {
                    Some(close) => {
                        let block_text = &text[candidate_start..=close];
                        let block_type = block_type(&header.keyword);
                        let meta = InfraMetadata {
                            resource_type: header.labels.first().cloned(),
                            resource_name: if header.labels.len() > 1 {
                                header.labels.get(1).cloned()
                            } else {
                                header.labels.first().cloned()
                            },
                            block_type: block_type.unwrap_or(BlockType::Resource),
                        };
                        let pieces = split_oversized(
                            block_text,
                            options.max_chunk_size,
                            options.overlap,
                            candidate_start,
                            &mut warnings,
                        );
                        for piece in pieces {
                            let token_estimate = count_tokens(&piece.content);
                            chunks.push(Chunk {
                                index: 0,
                                start_offset: piece.start_in_unit,
                                end_offset: piece.end_in_unit,
                                content: piece.content,
                                metadata: ChunkMetadata::infra(token_estimate, meta.clone()),
                            });
                        }
                        i = close + 1;
                    }
                    None => {
                        had_parse_error = true;
                        break;
                    }
                },
                None => {
                    let Some(next) = text[candidate_start..].find('\n') else {
                        break;
                    };
                    i = candidate_start + next + 1;
                }
            }
        }

        if had_parse_error || chunks.is_empty() {
            warnings.push(ChunkWarning::new(
                i,
                "failed to balance braces for a top-level HCL block",
                "HCL_PARSE_ERROR",
            ));
        }

        for (idx, chunk) in chunks.iter_mut().enumerate() {
            chunk.index = idx;
        }

        Ok(ChunkResult::new(chunks, warnings, self.name(), content.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_handle_tf_extension() {
        let c = HclChunker::new();
        assert!(c.can_handle(None, Some("main.tf")));
    }

    #[test]
    fn one_chunk_per_resource_block() {
        let c = HclChunker::new();
        let text = r#"
resource "aws_instance" "web" {
  ami = "abc"
}

resource "aws_instance" "db" {
  ami = "xyz"
}
"#;
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 2);
    }

    #[test]
    fn brace_inside_string_does_not_confuse_scanner() {
        let c = HclChunker::new();
        let text = r#"
variable "greeting" {
  default = "say { hello }"
}
"#;
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 1);
    }
}
