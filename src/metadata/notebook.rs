//! Metadata for Jupyter notebook cell-group chunks

use serde::{Deserialize, Serialize};

/// The Jupyter cell type a chunk's content was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    Code,
    Markdown,
    Raw,
}

/// Metadata describing one notebook cell, or a run of adjacent cells
/// merged together by the size splitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotebookMetadata {
    pub cell_type: CellType,
    /// Zero-based index of the (first, if merged) source cell.
    pub cell_index: usize,
    pub execution_count: Option<i64>,
    pub has_output: bool,
    /// MIME/output types present, e.g. `"text/plain"`, `"image/png"`, `"error"`.
    pub output_types: Vec<String>,
    pub kernel: Option<String>,
}
