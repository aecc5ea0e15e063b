//! Tree-sitter-driven source code chunker
//!
//! One [`CodeChunker`] instance is registered per supported language (see
//! [`languages::all`]); each wraps the same traversal and splitting logic
//! around a different [`languages::LanguageStrategy`].

mod languages;

use tree_sitter::{Node, Parser};

use crate::cancel::CancellationToken;
use crate::chunk::{Chunk, ChunkResult};
use crate::chunker::splitter::split_oversized;
use crate::chunker::text::TextChunker;
use crate::chunker::{matches_extension, Chunker};
use crate::error::{ChunkError, ChunkWarning};
use crate::metadata::ChunkMetadata;
use crate::options::ChunkOptions;
use crate::tokenizer::count_tokens;
use languages::{ChunkRole, LanguageStrategy};

/// One per-language tree-sitter chunker instance.
pub struct CodeChunker {
    strategy: LanguageStrategy,
    priority: i32,
    name: &'static str,
}

/// Build the full set of code chunkers, one per supported language, at
/// the priorities named in the registry's priority table (80-95).
pub fn all_code_chunkers() -> Vec<Box<dyn Chunker>> {
    let priorities: &[(&str, i32, &str)] = &[
        ("rust", 95, "code-rust"),
        ("python", 94, "code-python"),
        ("javascript", 93, "code-javascript"),
        ("typescript", 92, "code-typescript"),
        ("java", 91, "code-java"),
        ("go", 90, "code-go"),
        ("cpp", 89, "code-cpp"),
        ("c", 88, "code-c"),
    ];
    let mut strategies = languages::all();
    let mut out: Vec<Box<dyn Chunker>> = Vec::new();
    for (tag, priority, name) in priorities {
        if let Some(pos) = strategies.iter().position(|s| s.tag == *tag) {
            let strategy = strategies.remove(pos);
            out.push(Box::new(CodeChunker {
                strategy,
                priority: *priority,
                name,
            }));
        }
    }
    out
}

/// Walk backward from `node` over a contiguous run of immediately
/// preceding comment siblings (no blank line between them), returning the
/// extended start byte.
fn extend_over_comments(node: &Node, source: &[u8]) -> usize {
    let mut start = node.start_byte();
    let mut current = *node;
    while let Some(prev) = current.prev_sibling() {
        if !prev.kind().contains("comment") {
            break;
        }
        let gap = &source[prev.end_byte()..start];
        let newline_count = gap.iter().filter(|&&b| b == b'\n').count();
        if newline_count > 1 {
            break;
        }
        start = prev.start_byte();
        current = prev;
    }
    start
}

impl CodeChunker {
    fn walk(
        &self,
        node: Node,
        source: &[u8],
        parent_class: Option<&str>,
        out: &mut Vec<(usize, usize, ChunkMetadata)>,
        cancel: &CancellationToken,
    ) -> Result<(), ChunkError> {
        if cancel.is_cancelled() {
            return Err(ChunkError::Cancelled);
        }
        match (self.strategy.classify)(&node) {
            Some(ChunkRole::Function) | Some(ChunkRole::Method) => {
                self.emit(node, source, parent_class, out);
            }
            Some(ChunkRole::Class) => {
                if self.strategy.chunk_methods {
                    let class_name = node
                        .child_by_field_name("name")
                        .and_then(|n| n.utf8_text(source).ok())
                        .map(String::from);
                    let mut cursor = node.walk();
                    for child in node.children(&mut cursor) {
                        self.walk(child, source, class_name.as_deref(), out, cancel)?;
                    }
                } else {
                    self.emit(node, source, parent_class, out);
                }
            }
            None => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    self.walk(child, source, parent_class, out, cancel)?;
                }
            }
        }
        Ok(())
    }

    fn emit(
        &self,
        node: Node,
        source: &[u8],
        parent_class: Option<&str>,
        out: &mut Vec<(usize, usize, ChunkMetadata)>,
    ) {
        let start = extend_over_comments(&node, source);
        let end = node.end_byte();
        let metadata = (self.strategy.extract_metadata)(&node, source, parent_class);
        let meta = ChunkMetadata::code(0, metadata);
        out.push((start, end, meta));
    }
}

impl Chunker for CodeChunker {
    fn name(&self) -> &'static str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_handle(&self, mime: Option<&str>, language_hint: Option<&str>) -> bool {
        if let Some(mime) = mime {
            let wanted = format!("text/x-{}", self.strategy.tag);
            if mime.eq_ignore_ascii_case(&wanted) {
                return true;
            }
        }
        if let Some(hint) = language_hint {
            if hint.eq_ignore_ascii_case(self.strategy.tag) {
                return true;
            }
            if matches_extension(hint, self.strategy.extensions) {
                return true;
            }
        }
        false
    }

    fn chunk(
        &self,
        content: &[u8],
        options: &ChunkOptions,
        cancel: &CancellationToken,
    ) -> Result<ChunkResult, ChunkError> {
        let mut parser = Parser::new();
        if parser.set_language(&(self.strategy.language)()).is_err() {
            return TextChunker::new().chunk(content, options, cancel);
        }
        let Some(tree) = parser.parse(content, None) else {
            return TextChunker::new().chunk(content, options, cancel);
        };

        let mut warnings: Vec<ChunkWarning> = Vec::new();
        if tree.root_node().has_error() {
            warnings.push(ChunkWarning::new(
                0,
                "tree-sitter parse tree contains syntax errors; chunked on a best-effort basis",
                "CODE_PARSE_ERROR",
            ));
        }

        let mut spans = Vec::new();
        self.walk(tree.root_node(), content, None, &mut spans, cancel)?;
        spans.sort_by_key(|(start, _, _)| *start);

        let mut chunks = Vec::new();
        for (start, end, meta) in spans {
            let text = String::from_utf8_lossy(&content[start..end]);
            let pieces = split_oversized(&text, options.max_chunk_size, options.overlap, start, &mut warnings);
            for piece in pieces {
                let token_estimate = count_tokens(&piece.content);
                let mut metadata = meta.clone();
                metadata.token_estimate = token_estimate;
                chunks.push(Chunk {
                    index: 0,
                    start_offset: piece.start_in_unit,
                    end_offset: piece.end_in_unit,
                    content: piece.content,
                    metadata,
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
    fn registers_eight_language_chunkers() {
        assert_eq!(all_code_chunkers().len(), 8);
    }

    #[test]
    fn rust_chunker_handles_rs_extension() {
        let chunkers = all_code_chunkers();
        let rust = chunkers.iter().find(|c| c.name() == "code-rust").unwrap();
        assert!(rust.can_handle(None, Some("main.rs")));
        assert!(rust.can_handle(None, Some("rust")));
    }

    #[test]
    fn rust_functions_are_chunked() {
        let chunkers = all_code_chunkers();
        let rust = chunkers.iter().find(|c| c.name() == "code-rust").unwrap();
        let code = "fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n\nfn sub(a: i32, b: i32) -> i32 {\n    a - b\n}\n";
        let result = rust
            .chunk(code.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 2);
    }

    #[test]
    fn malformed_code_still_chunks_best_effort() {
        let chunkers = all_code_chunkers();
        let rust = chunkers.iter().find(|c| c.name() == "code-rust").unwrap();
        let code = "fn broken( {\n\nfn add(a: i32, b: i32) -> i32 { a + b }\n";
        let result = rust
            .chunk(code.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert!(result.warnings.iter().any(|w| w.code == "CODE_PARSE_ERROR") || result.total_chunks >= 1);
    }
}
