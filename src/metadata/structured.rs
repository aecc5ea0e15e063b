//! Metadata for generic structured-data chunks (JSON / XML)

use serde::{Deserialize, Serialize};

/// Metadata describing one structural unit of a JSON or XML document:
/// an object/array element, a record within a homogeneous array, or a
/// table extracted from a DOCX/ODT container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredMetadata {
    /// JSON Pointer / XPath-like path to this element's schema position,
    /// with array indices elided (e.g. `"/users/[]/address"`).
    pub schema_path: Option<String>,
    /// Object key or XML tag name naming this element, if any.
    pub element_name: Option<String>,
    /// Full path including array indices (e.g. `"/users/3/address"`).
    pub element_path: Option<String>,
    /// Path to the enclosing table, for table-row chunks.
    pub table_path: Option<String>,
    /// Zero-based index within an array/record set this chunk belongs to.
    pub record_index: Option<usize>,
    /// Total size of the array/record set this chunk belongs to.
    pub record_count: Option<usize>,
    /// Object keys present at this element's level, in source order.
    pub key_names: Vec<String>,
}
