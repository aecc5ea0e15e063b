//! Metadata for source-code chunks

use serde::{Deserialize, Serialize};

/// Declared or inferred visibility of a code chunk's top-level symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Internal,
    Package,
    /// File/module-private (e.g. Rust items with no `pub`).
    File,
}

/// Boolean properties of a function/method/class that don't fit neatly
/// into `Visibility` or a single scalar field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFlags {
    pub is_async: bool,
    pub is_static: bool,
    pub is_exported: bool,
    pub is_generator: bool,
    pub is_getter: bool,
    pub is_setter: bool,
    pub is_constructor: bool,
}

/// Metadata describing one function, method, class, or other
/// tree-sitter-chunkable unit of source code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeMetadata {
    pub language: String,
    pub function_name: Option<String>,
    pub class_name: Option<String>,
    pub signature: Option<String>,
    pub return_type: Option<String>,
    pub parameters: Vec<String>,
    pub visibility: Option<Visibility>,
    pub flags: CodeFlags,
    pub decorators: Vec<String>,
    pub docstring: Option<String>,
    pub namespace: Option<String>,
    pub parent_class: Option<String>,
    pub implements: Vec<String>,
    /// 1-indexed source line the chunk's content starts on.
    pub line_start: usize,
    /// 1-indexed source line the chunk's content ends on (inclusive).
    pub line_end: usize,
}
