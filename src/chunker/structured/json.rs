//! JSON chunker: one chunk per top-level array element or object key

use serde_json::Value;

use crate::cancel::CancellationToken;
use crate::chunk::{Chunk, ChunkResult};
use crate::chunker::splitter::split_oversized;
use crate::chunker::text::TextChunker;
use crate::chunker::{matches_extension, Chunker};
use crate::error::{ChunkError, ChunkWarning};
use crate::metadata::{ChunkMetadata, StructuredMetadata};
use crate::options::ChunkOptions;
use crate::tokenizer::count_tokens;

const EXTENSIONS: &[&str] = &[".json"];

/// Splits JSON into one chunk per top-level array element (or object key,
/// when the root is an object).
#[derive(Debug, Default)]
pub struct JsonChunker;

impl JsonChunker {
    pub fn new() -> Self {
        Self
    }
}

fn key_names(value: &Value) -> Vec<String> {
    match value {
        Value::Object(map) => map.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

fn render(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

impl Chunker for JsonChunker {
    fn name(&self) -> &'static str {
        "json"
    }

    fn priority(&self) -> i32 {
        25
    }

    fn can_handle(&self, mime: Option<&str>, language_hint: Option<&str>) -> bool {
        if let Some(mime) = mime {
            if mime.eq_ignore_ascii_case("application/json") {
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

        let value: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                warnings.push(ChunkWarning::new(
                    e.column(),
                    format!("failed to parse JSON: {e}"),
                    "JSON_PARSE_ERROR",
                ));
                let fallback = TextChunker::new().chunk(content, options, cancel)?;
                let mut result = fallback;
                warnings.extend(std::mem::take(&mut result.warnings));
                result.warnings = warnings;
                result.chunker_used = self.name();
                return Ok(result);
            }
        };

        let mut chunks = Vec::new();
        let mut cursor = 0usize;

        let mut emit = |content: String,
                         meta: StructuredMetadata,
                         warnings: &mut Vec<ChunkWarning>,
                         chunks: &mut Vec<Chunk>| {
            let pieces = split_oversized(&content, options.max_chunk_size, options.overlap, cursor, warnings);
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
            cursor += content.len() + 1;
        };

        match &value {
            Value::Array(items) => {
                let record_count = items.len();
                for (idx, item) in items.iter().enumerate() {
                    if cancel.is_cancelled() {
                        return Err(ChunkError::Cancelled);
                    }
                    let meta = StructuredMetadata {
                        schema_path: Some("/[]".to_string()),
                        element_path: Some(format!("/{idx}")),
                        record_index: Some(idx),
                        record_count: Some(record_count),
                        key_names: key_names(item),
                        ..Default::default()
                    };
                    emit(render(item), meta, &mut warnings, &mut chunks);
                }
            }
            Value::Object(map) => {
                for (key, item) in map.iter() {
                    if cancel.is_cancelled() {
                        return Err(ChunkError::Cancelled);
                    }
                    let meta = StructuredMetadata {
                        schema_path: Some(format!("/{key}")),
                        element_name: Some(key.clone()),
                        element_path: Some(format!("/{key}")),
                        key_names: key_names(item),
                        ..Default::default()
                    };
                    emit(render(item), meta, &mut warnings, &mut chunks);
                }
            }
            other => {
                let meta = StructuredMetadata::default();
                emit(render(other), meta, &mut warnings, &mut chunks);
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
    fn can_handle_json_extension() {
        let c = JsonChunker::new();
        assert!(c.can_handle(None, Some("data.json")));
    }

    #[test]
    fn array_root_produces_one_chunk_per_element() {
        let c = JsonChunker::new();
        let text = r#"[{"a":1},{"b":2},{"c":3}]"#;
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 3);
    }

    #[test]
    fn object_root_produces_one_chunk_per_key() {
        let c = JsonChunker::new();
        let text = r#"{"users": [1,2], "count": 2}"#;
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 2);
    }

    #[test]
    fn malformed_json_falls_back_with_warning() {
        let c = JsonChunker::new();
        let text = "{not valid json";
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert!(result.warnings.iter().any(|w| w.code == "JSON_PARSE_ERROR"));
        assert!(result.total_chunks >= 1);
    }
}
