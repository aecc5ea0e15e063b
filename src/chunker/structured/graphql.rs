//! GraphQL chunker: one chunk per top-level type definition

use crate::cancel::CancellationToken;
use crate::chunk::{Chunk, ChunkResult};
use crate::chunker::splitter::split_oversized;
use crate::chunker::{matches_extension, Chunker};
use crate::error::{ChunkError, ChunkWarning};
use crate::metadata::{ChunkMetadata, SchemaMetadata, TypeKind};
use crate::options::ChunkOptions;
use crate::tokenizer::count_tokens;

const EXTENSIONS: &[&str] = &[".graphql", ".gql"];
const KEYWORDS: &[&str] = &[
    "type", "input", "interface", "union", "enum", "scalar", "directive", "schema",
];

/// Splits a GraphQL SDL document into one chunk per top-level type
/// definition, attaching any leading `"""`-block or `#`-line description.
#[derive(Debug, Default)]
pub struct GraphQlChunker;

impl GraphQlChunker {
    pub fn new() -> Self {
        Self
    }
}

fn type_kind(keyword: &str) -> TypeKind {
    match keyword {
        "type" => TypeKind::Type,
        "input" => TypeKind::Input,
        "interface" => TypeKind::Interface,
        "union" => TypeKind::Union,
        "enum" => TypeKind::Enum,
        "scalar" => TypeKind::Scalar,
        "directive" => TypeKind::Directive,
        "schema" => TypeKind::Schema,
        _ => TypeKind::Type,
    }
}

fn find_matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0i32;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// A keyword is top-level if nothing but whitespace precedes it since the
/// start of input, or the nearest preceding non-whitespace character closes
/// out a prior statement (`}` or `;`) — not only when it starts its own
/// line, since multiple declarations may share a line.
fn at_top_level(text: &str, pos: usize) -> bool {
    match text[..pos].trim_end().chars().last() {
        None => true,
        Some(c) => c == '}' || c == ';',
    }
}

/// Walk backward from `decl_start` over a contiguous run of blank lines,
/// `#` comment lines, and a trailing `"""`-block description, returning
/// the extended start offset.
fn extend_over_description(text: &str, decl_start: usize) -> usize {
    let mut start = decl_start;
    loop {
        let prefix = &text[..start];
        let trimmed = prefix.trim_end_matches('\n');
        if trimmed.len() < prefix.len() && trimmed.ends_with("\"\"\"") {
            if let Some(open) = trimmed[..trimmed.len() - 3].rfind("\"\"\"") {
                start = open;
                continue;
            }
        }
        let line_start = trimmed.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line = &trimmed[line_start..];
        if line.trim_start().starts_with('#') {
            start = line_start;
            continue;
        }
        break;
    }
    start
}

impl Chunker for GraphQlChunker {
    fn name(&self) -> &'static str {
        "graphql"
    }

    fn priority(&self) -> i32 {
        41
    }

    fn can_handle(&self, mime: Option<&str>, language_hint: Option<&str>) -> bool {
        if let Some(mime) = mime {
            if mime.eq_ignore_ascii_case("application/graphql") {
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
        let mut prev_decl_end = 0usize;
        while i < text.len() {
            if cancel.is_cancelled() {
                return Err(ChunkError::Cancelled);
            }
            let Some(rel) = text[i..].find(char::is_alphabetic) else {
                break;
            };
            let mut start = i + rel;
            if !at_top_level(&text, start) {
                let Some(next) = text[start..].find('\n') else { break };
                i = start + next + 1;
                continue;
            }
            let word_end = text[start..].find(|c: char| !c.is_alphanumeric()).map(|o| start + o).unwrap_or(text.len());
            let mut word = &text[start..word_end];
            let mut rest_start = word_end;
            if word == "extend" {
                let after = text[word_end..].trim_start();
                let skipped = text[word_end..].len() - after.len();
                let next_start = word_end + skipped;
                let next_end = text[next_start..].find(|c: char| !c.is_alphanumeric()).map(|o| next_start + o).unwrap_or(text.len());
                word = &text[next_start..next_end];
                rest_start = next_end;
                start = i + rel;
            }
            if !KEYWORDS.contains(&word) {
                let Some(next) = text[start..].find('\n') else { break };
                i = start + next + 1;
                continue;
            }
            let kind = type_kind(word);
            let name_region_end = text[rest_start..].find(['{', '\n']).map(|o| rest_start + o).unwrap_or(text.len());
            let name_region = text[rest_start..name_region_end].trim();
            let name = name_region.split(['(', ' ']).next().unwrap_or("").to_string();

            let (decl_end, has_brace) = match text[rest_start..].find('{') {
                Some(brace_rel) if rest_start + brace_rel < text[rest_start..].find('\n').map(|n| rest_start + n).unwrap_or(text.len()) + 1 => {
                    let brace_start = rest_start + brace_rel;
                    match find_matching_brace(bytes, brace_start) {
                        Some(close) => (close + 1, true),
                        None => (text[rest_start..].find('\n').map(|n| rest_start + n).unwrap_or(text.len()), false),
                    }
                }
                _ => {
                    let line_end = text[rest_start..].find('\n').map(|n| rest_start + n).unwrap_or(text.len());
                    (line_end, false)
                }
            };
            let _ = has_brace;

            let extended_start = extend_over_description(&text, start).max(prev_decl_end);
            let decl_text = &text[extended_start..decl_end];
            let meta = SchemaMetadata {
                message_name: None,
                service_name: None,
                rpc_name: None,
                type_name: Some(name),
                type_kind: kind,
            };
            let pieces = split_oversized(decl_text, options.max_chunk_size, options.overlap, extended_start, &mut warnings);
            for piece in pieces {
                let token_estimate = count_tokens(&piece.content);
                chunks.push(Chunk {
                    index: 0,
                    start_offset: piece.start_in_unit,
                    end_offset: piece.end_in_unit,
                    content: piece.content,
                    metadata: ChunkMetadata::schema(token_estimate, meta.clone()),
                });
            }
            prev_decl_end = decl_end;
            i = decl_end;
        }

        if chunks.is_empty() && !text.trim().is_empty() {
            warnings.push(ChunkWarning::new(0, "no recognizable top-level GraphQL declarations", "GRAPHQL_PARSE_ERROR"));
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
    fn can_handle_graphql_extension() {
        let c = GraphQlChunker::new();
        assert!(c.can_handle(None, Some("schema.graphql")));
    }

    #[test]
    fn one_chunk_per_type_definition() {
        let c = GraphQlChunker::new();
        let text = r#"
type User {
  id: ID!
  name: String
}

enum Role {
  ADMIN
  MEMBER
}
"#;
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 2);
    }

    #[test]
    fn scalar_without_braces_is_one_chunk() {
        let c = GraphQlChunker::new();
        let text = "scalar DateTime\n\ntype Query {\n  now: DateTime\n}\n";
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 2);
    }

    #[test]
    fn directive_name_keeps_leading_at_sign() {
        let c = GraphQlChunker::new();
        let text = "directive @auth on FIELD\n";
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        let meta = match &result.chunks[0].metadata.payload {
            crate::metadata::MetadataPayload::Schema(s) => s,
            other => panic!("expected Schema metadata, got {other:?}"),
        };
        assert_eq!(meta.type_name.as_deref(), Some("@auth"));
    }

    #[test]
    fn multiple_declarations_on_one_line_are_separate_chunks() {
        let c = GraphQlChunker::new();
        let text = "type A { id: ID } type B { id: ID } type C { id: ID }\n";
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 3);
    }
}
