//! Protobuf chunker: a preamble chunk plus one chunk per top-level
//! `message`, `enum`, or `service`

use crate::cancel::CancellationToken;
use crate::chunk::{Chunk, ChunkResult};
use crate::chunker::splitter::split_oversized;
use crate::chunker::{matches_extension, Chunker};
use crate::error::{ChunkError, ChunkWarning};
use crate::metadata::{ChunkMetadata, SchemaMetadata, TypeKind};
use crate::options::ChunkOptions;
use crate::tokenizer::count_tokens;

const EXTENSIONS: &[&str] = &[".proto"];
const KEYWORDS: &[&str] = &["message", "enum", "service"];

/// Splits a `.proto` file into a preamble chunk and one chunk per
/// top-level `message`, `enum`, or `service`. Nested messages stay inside
/// their enclosing chunk.
#[derive(Debug, Default)]
pub struct ProtobufChunker;

impl ProtobufChunker {
    pub fn new() -> Self {
        Self
    }
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

struct TopLevelDecl {
    keyword: &'static str,
    name: String,
    start: usize,
    end: usize,
}

fn find_top_level_decls(text: &str) -> Result<Vec<TopLevelDecl>, String> {
    let bytes = text.as_bytes();
    let mut decls = Vec::new();
    let mut i = 0usize;
    while i < text.len() {
        let Some(rel) = text[i..].find(char::is_alphabetic) else {
            break;
        };
        let start = i + rel;
        // Top-level if only whitespace precedes the keyword since the start
        // of input, or the nearest preceding non-whitespace character closes
        // out a prior statement (`}`/`;`) — multiple declarations may share
        // a line.
        let before_ok = match text[..start].trim_end().chars().last() {
            None => true,
            Some(c) => c == '}' || c == ';',
        };
        if !before_ok {
            let Some(next) = text[start..].find('\n') else { break };
            i = start + next + 1;
            continue;
        }
        let word_end = text[start..].find(|c: char| !c.is_alphanumeric() && c != '_').map(|o| start + o).unwrap_or(text.len());
        let word = &text[start..word_end];
        if let Some(&keyword) = KEYWORDS.iter().find(|k| **k == word) {
            let rest = &text[word_end..];
            let name_rel = rest.find(|c: char| !c.is_whitespace()).unwrap_or(0);
            let name_start = word_end + name_rel;
            let name_end = text[name_start..].find(|c: char| c.is_whitespace() || c == '{').map(|o| name_start + o).unwrap_or(name_start);
            let name = text[name_start..name_end].to_string();
            let Some(brace_rel) = text[name_end..].find('{') else {
                return Err(format!("no opening brace for {keyword} {name}"));
            };
            let brace_start = name_end + brace_rel;
            let Some(close) = find_matching_brace(bytes, brace_start) else {
                return Err(format!("unbalanced braces in {keyword} {name}"));
            };
            decls.push(TopLevelDecl { keyword, name, start, end: close + 1 });
            i = close + 1;
        } else {
            let Some(next) = text[start..].find('\n') else { break };
            i = start + next + 1;
        }
    }
    Ok(decls)
}

fn type_kind(keyword: &str) -> TypeKind {
    match keyword {
        "message" => TypeKind::Message,
        "enum" => TypeKind::Enum,
        "service" => TypeKind::Service,
        _ => TypeKind::Message,
    }
}

impl Chunker for ProtobufChunker {
    fn name(&self) -> &'static str {
        "protobuf"
    }

    fn priority(&self) -> i32 {
        42
    }

    fn can_handle(&self, mime: Option<&str>, language_hint: Option<&str>) -> bool {
        if let Some(mime) = mime {
            if mime.eq_ignore_ascii_case("text/x-protobuf") {
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
        let mut chunks = Vec::new();

        let decls = match find_top_level_decls(&text) {
            Ok(d) => d,
            Err(msg) => {
                warnings.push(ChunkWarning::new(0, format!("failed to parse Protobuf: {msg}"), "PROTO_PARSE_ERROR"));
                let token_estimate = count_tokens(&text);
                let chunk = Chunk {
                    index: 0,
                    start_offset: 0,
                    end_offset: content.len(),
                    content: text.into_owned(),
                    metadata: ChunkMetadata::schema(
                        token_estimate,
                        SchemaMetadata {
                            message_name: None,
                            service_name: None,
                            rpc_name: None,
                            type_name: None,
                            type_kind: TypeKind::Preamble,
                        },
                    ),
                };
                return Ok(ChunkResult::new(vec![chunk], warnings, self.name(), content.len()));
            }
        };

        let preamble_end = decls.first().map(|d| d.start).unwrap_or(text.len());
        let preamble = text[..preamble_end].trim();
        if !preamble.is_empty() {
            let meta = SchemaMetadata {
                message_name: None,
                service_name: None,
                rpc_name: None,
                type_name: None,
                type_kind: TypeKind::Preamble,
            };
            let pieces = split_oversized(preamble, options.max_chunk_size, options.overlap, 0, &mut warnings);
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
        }

        for decl in &decls {
            if cancel.is_cancelled() {
                return Err(ChunkError::Cancelled);
            }
            let decl_text = &text[decl.start..decl.end];
            let kind = type_kind(decl.keyword);
            let meta = SchemaMetadata {
                message_name: if decl.keyword == "message" { Some(decl.name.clone()) } else { None },
                service_name: if decl.keyword == "service" { Some(decl.name.clone()) } else { None },
                rpc_name: None,
                type_name: Some(decl.name.clone()),
                type_kind: kind,
            };
            let pieces = split_oversized(decl_text, options.max_chunk_size, options.overlap, decl.start, &mut warnings);
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
    fn can_handle_proto_extension() {
        let c = ProtobufChunker::new();
        assert!(c.can_handle(None, Some("schema.proto")));
    }

    #[test]
    fn preamble_and_messages_are_separate_chunks() {
        let c = ProtobufChunker::new();
        let text = r#"
syntax = "proto3";
package foo;

message User {
  string name = 1;
}

service UserService {
  rpc Get(User) returns (User);
}
"#;
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 3);
    }

    #[test]
    fn declarations_sharing_a_line_are_separate_chunks() {
        let c = ProtobufChunker::new();
        let text = "syntax = \"proto3\";\nmessage M{} enum E{VALUE=0;} service S{}\n";
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 4);
    }
}
