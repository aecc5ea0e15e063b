//! Metadata for prose/markdown document chunks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Confidence in how faithfully a chunk's `content` was extracted from its
/// source container (meaningful for DOCX/ODT, always `High` elsewhere).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionQuality {
    High,
    Medium,
    Low,
}

impl Default for ExtractionQuality {
    fn default() -> Self {
        ExtractionQuality::High
    }
}

/// Metadata describing one prose/markdown section or block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub heading: Option<String>,
    /// 1 through 6, matching the heading's nesting depth.
    pub heading_level: Option<u8>,
    /// Breadcrumb of enclosing heading text, outermost first.
    pub section_path: Vec<String>,
    /// Outline numbering if the source carries one (e.g. `"2.3.1"`).
    pub section_number: Option<String>,
    pub author: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub page_number: Option<u32>,
    pub page_count: Option<u32>,
    pub word_count: usize,
    pub has_code_block: bool,
    pub code_language: Option<String>,
    /// Nesting depth of the deepest list item this chunk contains, 0 if none.
    pub list_depth: usize,
    pub is_table: bool,
    pub is_footnote: bool,
    pub extraction_quality: ExtractionQuality,
}
