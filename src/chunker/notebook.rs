//! Notebook chunker: groups consecutive Jupyter cells of the same type

use serde_json::Value;

use crate::cancel::CancellationToken;
use crate::chunk::{Chunk, ChunkResult};
use crate::chunker::splitter::split_oversized;
use crate::chunker::{matches_extension, Chunker};
use crate::error::{ChunkError, ChunkWarning};
use crate::metadata::{CellType, ChunkMetadata, ContentKind, NotebookMetadata};
use crate::options::ChunkOptions;
use crate::tokenizer::count_tokens;

const EXTENSIONS: &[&str] = &[".ipynb"];

/// Groups consecutive same-`cell_type` notebook cells into one logical
/// chunk each, rendering code cells fenced and outputs inline.
#[derive(Debug, Default)]
pub struct NotebookChunker;

impl NotebookChunker {
    pub fn new() -> Self {
        Self
    }
}

struct Cell {
    cell_type: CellType,
    source: String,
    execution_count: Option<i64>,
    outputs: Vec<Value>,
}

fn source_text(cell: &Value) -> String {
    match cell.get("source") {
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(""),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

fn parse_cell(value: &Value) -> Option<Cell> {
    let cell_type = match value.get("cell_type").and_then(Value::as_str) {
        Some("code") => CellType::Code,
        Some("markdown") => CellType::Markdown,
        Some("raw") => CellType::Raw,
        _ => return None,
    };
    let execution_count = value.get("execution_count").and_then(Value::as_i64);
    let outputs = value
        .get("outputs")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    Some(Cell {
        cell_type,
        source: source_text(value),
        execution_count,
        outputs,
    })
}

fn render_output(output: &Value) -> Option<String> {
    match output.get("output_type").and_then(Value::as_str) {
        Some("stream") => output.get("text").map(join_text_field),
        Some("execute_result") | Some("display_data") => output
            .get("data")
            .and_then(|d| d.get("text/plain"))
            .map(join_text_field),
        Some("error") => {
            let ename = output.get("ename").and_then(Value::as_str).unwrap_or("Error");
            let evalue = output.get("evalue").and_then(Value::as_str).unwrap_or("");
            Some(format!("{ename}: {evalue}"))
        }
        _ => None,
    }
}

fn join_text_field(value: &Value) -> String {
    match value {
        Value::Array(parts) => parts.iter().filter_map(|v| v.as_str()).collect::<Vec<_>>().join(""),
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

fn output_type_name(output: &Value) -> Option<String> {
    output.get("output_type").and_then(Value::as_str).map(|s| s.to_string())
}

fn render_group(cells: &[&Cell]) -> (String, bool, Vec<String>) {
    let mut rendered = String::new();
    let mut has_output = false;
    let mut output_types = Vec::new();

    for cell in cells {
        match cell.cell_type {
            CellType::Markdown | CellType::Raw => {
                rendered.push_str(&cell.source);
                rendered.push('\n');
            }
            CellType::Code => {
                rendered.push_str("```\n");
                rendered.push_str(&cell.source);
                rendered.push_str("\n```\n");
                for output in &cell.outputs {
                    if let Some(name) = output_type_name(output) {
                        output_types.push(name);
                    }
                    if let Some(text) = render_output(output) {
                        has_output = true;
                        rendered.push_str("# Output:\n");
                        rendered.push_str(&text);
                        rendered.push('\n');
                    }
                }
            }
        }
    }
    (rendered, has_output, output_types)
}

fn detect_kernel(root: &Value) -> Option<String> {
    root.get("metadata")
        .and_then(|m| m.get("kernelspec"))
        .and_then(|k| k.get("name"))
        .and_then(Value::as_str)
        .or_else(|| {
            root.get("metadata")
                .and_then(|m| m.get("kernelspec"))
                .and_then(|k| k.get("display_name"))
                .and_then(Value::as_str)
        })
        .or_else(|| {
            root.get("metadata")
                .and_then(|m| m.get("language_info"))
                .and_then(|l| l.get("name"))
                .and_then(Value::as_str)
        })
        .map(|s| s.to_string())
}

impl Chunker for NotebookChunker {
    fn name(&self) -> &'static str {
        "notebook"
    }

    fn priority(&self) -> i32 {
        76
    }

    fn can_handle(&self, mime: Option<&str>, language_hint: Option<&str>) -> bool {
        if let Some(mime) = mime {
            if mime.eq_ignore_ascii_case("application/x-ipynb+json") {
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
        let root: Value = serde_json::from_str(&text)
            .map_err(|e| ChunkError::NotebookInvalid(format!("not valid JSON: {e}")))?;

        let raw_cells = root
            .get("cells")
            .and_then(Value::as_array)
            .ok_or_else(|| ChunkError::NotebookInvalid("missing top-level \"cells\" array".to_string()))?;

        let kernel = detect_kernel(&root);
        let cells: Vec<Cell> = raw_cells.iter().filter_map(parse_cell).collect();

        let mut warnings: Vec<ChunkWarning> = Vec::new();
        let mut chunks = Vec::new();
        let mut cursor = 0usize;
        let mut i = 0usize;

        while i < cells.len() {
            if cancel.is_cancelled() {
                return Err(ChunkError::Cancelled);
            }
            let start_index = i;
            let cell_type = cells[i].cell_type;
            let mut group: Vec<&Cell> = vec![&cells[i]];
            let mut j = i + 1;
            while j < cells.len() && cells[j].cell_type as u8 == cell_type as u8 {
                group.push(&cells[j]);
                j += 1;
            }

            let (rendered, has_output, output_types) = render_group(&group);

            let kind = match cell_type {
                CellType::Code => ContentKind::Code,
                CellType::Markdown | CellType::Raw => ContentKind::Markdown,
            };

            let pieces = split_oversized(&rendered, options.max_chunk_size, options.overlap, cursor, &mut warnings);
            for piece in pieces {
                let meta = NotebookMetadata {
                    cell_type,
                    cell_index: start_index,
                    execution_count: group.iter().find_map(|c| c.execution_count),
                    has_output,
                    output_types: output_types.clone(),
                    kernel: kernel.clone(),
                };
                let token_estimate = count_tokens(&piece.content);
                chunks.push(Chunk {
                    index: 0,
                    start_offset: piece.start_in_unit,
                    end_offset: piece.end_in_unit,
                    content: piece.content,
                    metadata: ChunkMetadata::notebook(kind, token_estimate, meta),
                });
            }
            cursor += rendered.len();
            i = j;
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

    fn sample_notebook() -> String {
        r#"{
            "metadata": {"kernelspec": {"name": "python3"}},
            "cells": [
                {"cell_type": "markdown", "source": ["# Title\n", "intro text"]},
                {"cell_type": "code", "execution_count": 1, "source": ["print('hi')"],
                 "outputs": [{"output_type": "stream", "text": ["hi\n"]}]},
                {"cell_type": "code", "execution_count": 2, "source": ["1 + 1"],
                 "outputs": [{"output_type": "execute_result", "data": {"text/plain": ["2"]}}]}
            ]
        }"#
        .to_string()
    }

    #[test]
    fn can_handle_ipynb_extension() {
        let c = NotebookChunker::new();
        assert!(c.can_handle(None, Some("analysis.ipynb")));
    }

    #[test]
    fn groups_consecutive_code_cells() {
        let c = NotebookChunker::new();
        let result = c
            .chunk(sample_notebook().as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 2);
    }

    #[test]
    fn detects_kernel_from_kernelspec() {
        let c = NotebookChunker::new();
        let result = c
            .chunk(sample_notebook().as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        let code_chunk = result
            .chunks
            .iter()
            .find(|ch| matches!(ch.metadata.kind, ContentKind::Code))
            .unwrap();
        if let crate::metadata::MetadataPayload::Notebook(meta) = &code_chunk.metadata.payload {
            assert_eq!(meta.kernel.as_deref(), Some("python3"));
        } else {
            panic!("expected Notebook metadata payload");
        }
    }

    #[test]
    fn invalid_json_is_fatal() {
        let c = NotebookChunker::new();
        let err = c
            .chunk(b"not json", &ChunkOptions::default(), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, ChunkError::NotebookInvalid(_)));
    }

    #[test]
    fn missing_cells_array_is_fatal() {
        let c = NotebookChunker::new();
        let err = c
            .chunk(b"{}", &ChunkOptions::default(), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, ChunkError::NotebookInvalid(_)));
    }
}
