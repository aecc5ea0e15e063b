//! Per-language grammar registration and chunkable-node recognition
//!
//! Grounded on `mcb-ast-utils`'s `set_language`/grammar-loading idiom; one
//! `LanguageStrategy` per supported language replaces that crate's
//! single-language assumption with a small dispatch table.

use tree_sitter::{Language, Node};

use crate::metadata::{CodeFlags, CodeMetadata, Visibility};

/// A node's role for chunking purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChunkRole {
    Function,
    Class,
    Method,
}

/// Everything a language needs to plug into the code chunker.
pub(crate) struct LanguageStrategy {
    pub tag: &'static str,
    pub extensions: &'static [&'static str],
    pub language: fn() -> Language,
    /// Whether methods nested inside a class/`impl` block are chunked
    /// independently of their enclosing class chunk.
    pub chunk_methods: bool,
    pub classify: fn(&Node) -> Option<ChunkRole>,
    pub extract_metadata: fn(&Node, &[u8], Option<&str>) -> CodeMetadata,
}

fn node_text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn line_bounds(node: &Node) -> (usize, usize) {
    (
        node.start_position().row + 1,
        node.end_position().row + 1,
    )
}

fn field_text<'a>(node: &Node, field: &str, source: &'a [u8]) -> Option<&'a str> {
    node.child_by_field_name(field).map(|n| node_text(&n, source))
}

// ---- Rust -----------------------------------------------------------

fn rust_classify(node: &Node) -> Option<ChunkRole> {
    match node.kind() {
        "function_item" => Some(ChunkRole::Function),
        "impl_item" | "struct_item" | "trait_item" | "enum_item" => Some(ChunkRole::Class),
        _ => None,
    }
}

fn rust_metadata(node: &Node, source: &[u8], parent_class: Option<&str>) -> CodeMetadata {
    let (line_start, line_end) = line_bounds(node);
    let name = field_text(node, "name", source).map(String::from);
    let is_function = node.kind() == "function_item";
    let mut flags = CodeFlags::default();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "async" {
            flags.is_async = true;
        }
    }
    let text = node_text(node, source);
    let visibility = if text.trim_start().starts_with("pub") {
        Visibility::Public
    } else {
        Visibility::File
    };
    CodeMetadata {
        language: "rust".to_string(),
        function_name: if is_function { name.clone() } else { None },
        class_name: if !is_function { name } else { None },
        signature: field_text(node, "parameters", source).map(|p| format!("{}{}", field_text(node, "name", source).unwrap_or(""), p)),
        return_type: field_text(node, "return_type", source).map(String::from),
        parameters: Vec::new(),
        visibility: Some(visibility),
        flags,
        decorators: Vec::new(),
        docstring: None,
        namespace: None,
        parent_class: parent_class.map(String::from),
        implements: Vec::new(),
        line_start,
        line_end,
    }
}

// ---- Python -----------------------------------------------------------

fn python_classify(node: &Node) -> Option<ChunkRole> {
    match node.kind() {
        "function_definition" => Some(ChunkRole::Function),
        "class_definition" => Some(ChunkRole::Class),
        _ => None,
    }
}

fn python_metadata(node: &Node, source: &[u8], parent_class: Option<&str>) -> CodeMetadata {
    let (line_start, line_end) = line_bounds(node);
    let name = field_text(node, "name", source).map(String::from);
    let is_function = node.kind() == "function_definition";
    let mut flags = CodeFlags::default();
    if let Some(prev) = node.prev_sibling() {
        if prev.kind() == "decorator" {
            flags.is_getter = node_text(&prev, source).contains("@property");
        }
    }
    let text = node_text(node, source);
    flags.is_async = text.trim_start().starts_with("async ");
    CodeMetadata {
        language: "python".to_string(),
        function_name: if is_function { name.clone() } else { None },
        class_name: if !is_function { name } else { None },
        signature: field_text(node, "parameters", source).map(String::from),
        return_type: field_text(node, "return_type", source).map(String::from),
        parameters: Vec::new(),
        visibility: Some(Visibility::Public),
        flags,
        decorators: Vec::new(),
        docstring: None,
        namespace: None,
        parent_class: parent_class.map(String::from),
        implements: Vec::new(),
        line_start,
        line_end,
    }
}

// ---- JavaScript / TypeScript -------------------------------------------

fn js_classify(node: &Node) -> Option<ChunkRole> {
    match node.kind() {
        "function_declaration" | "method_definition" | "arrow_function" => Some(ChunkRole::Function),
        "class_declaration" => Some(ChunkRole::Class),
        _ => None,
    }
}

fn js_metadata(node: &Node, source: &[u8], parent_class: Option<&str>, language: &str) -> CodeMetadata {
    let (line_start, line_end) = line_bounds(node);
    let name = field_text(node, "name", source).map(String::from);
    let is_class = node.kind() == "class_declaration";
    let text = node_text(node, source);
    let mut flags = CodeFlags::default();
    flags.is_async = text.trim_start().starts_with("async ");
    flags.is_static = text.contains("static ");
    flags.is_exported = text.trim_start().starts_with("export ");
    flags.is_generator = text.contains('*') && node.kind() != "class_declaration";
    CodeMetadata {
        language: language.to_string(),
        function_name: if !is_class { name.clone() } else { None },
        class_name: if is_class { name } else { None },
        signature: field_text(node, "parameters", source).map(String::from),
        return_type: field_text(node, "return_type", source).map(String::from),
        parameters: Vec::new(),
        visibility: Some(Visibility::Public),
        flags,
        decorators: Vec::new(),
        docstring: None,
        namespace: None,
        parent_class: parent_class.map(String::from),
        implements: Vec::new(),
        line_start,
        line_end,
    }
}

// ---- Java -----------------------------------------------------------

fn java_classify(node: &Node) -> Option<ChunkRole> {
    match node.kind() {
        "method_declaration" | "constructor_declaration" => Some(ChunkRole::Method),
        "class_declaration" | "interface_declaration" | "enum_declaration" => Some(ChunkRole::Class),
        _ => None,
    }
}

fn java_metadata(node: &Node, source: &[u8], parent_class: Option<&str>) -> CodeMetadata {
    let (line_start, line_end) = line_bounds(node);
    let name = field_text(node, "name", source).map(String::from);
    let is_type = matches!(node.kind(), "class_declaration" | "interface_declaration" | "enum_declaration");
    let text = node_text(node, source);
    let visibility = if text.contains("public ") {
        Visibility::Public
    } else if text.contains("private ") {
        Visibility::Private
    } else if text.contains("protected ") {
        Visibility::Protected
    } else {
        Visibility::Package
    };
    let mut flags = CodeFlags::default();
    flags.is_static = text.contains("static ");
    CodeMetadata {
        language: "java".to_string(),
        function_name: if !is_type { name.clone() } else { None },
        class_name: if is_type { name } else { None },
        signature: field_text(node, "parameters", source).map(String::from),
        return_type: field_text(node, "type", source).map(String::from),
        parameters: Vec::new(),
        visibility: Some(visibility),
        flags,
        decorators: Vec::new(),
        docstring: None,
        namespace: None,
        parent_class: parent_class.map(String::from),
        implements: Vec::new(),
        line_start,
        line_end,
    }
}

// ---- Go -----------------------------------------------------------

fn go_classify(node: &Node) -> Option<ChunkRole> {
    match node.kind() {
        "function_declaration" | "method_declaration" => Some(ChunkRole::Function),
        "type_declaration" => Some(ChunkRole::Class),
        _ => None,
    }
}

fn go_metadata(node: &Node, source: &[u8], parent_class: Option<&str>) -> CodeMetadata {
    let (line_start, line_end) = line_bounds(node);
    let name = field_text(node, "name", source).map(String::from);
    let is_exported = name.as_deref().map(|n| n.chars().next().is_some_and(|c| c.is_uppercase())).unwrap_or(false);
    let mut flags = CodeFlags::default();
    flags.is_exported = is_exported;
    CodeMetadata {
        language: "go".to_string(),
        function_name: if node.kind() != "type_declaration" { name.clone() } else { None },
        class_name: if node.kind() == "type_declaration" { name } else { None },
        signature: field_text(node, "parameters", source).map(String::from),
        return_type: field_text(node, "result", source).map(String::from),
        parameters: Vec::new(),
        visibility: Some(if is_exported { Visibility::Public } else { Visibility::Package }),
        flags,
        decorators: Vec::new(),
        docstring: None,
        namespace: None,
        parent_class: parent_class.map(String::from),
        implements: Vec::new(),
        line_start,
        line_end,
    }
}

// ---- C / C++ -----------------------------------------------------------

fn c_classify(node: &Node) -> Option<ChunkRole> {
    match node.kind() {
        "function_definition" => Some(ChunkRole::Function),
        "struct_specifier" | "class_specifier" => Some(ChunkRole::Class),
        _ => None,
    }
}

fn c_metadata(node: &Node, source: &[u8], parent_class: Option<&str>, language: &str) -> CodeMetadata {
    let (line_start, line_end) = line_bounds(node);
    let is_function = node.kind() == "function_definition";
    let name = node
        .child_by_field_name("declarator")
        .and_then(|d| find_identifier(&d, source));
    CodeMetadata {
        language: language.to_string(),
        function_name: if is_function { name.clone() } else { None },
        class_name: if !is_function { field_text(node, "name", source).map(String::from) } else { None },
        signature: None,
        return_type: field_text(node, "type", source).map(String::from),
        parameters: Vec::new(),
        visibility: Some(Visibility::Public),
        flags: CodeFlags::default(),
        decorators: Vec::new(),
        docstring: None,
        namespace: None,
        parent_class: parent_class.map(String::from),
        implements: Vec::new(),
        line_start,
        line_end,
    }
}

fn find_identifier(node: &Node, source: &[u8]) -> Option<String> {
    if node.kind() == "identifier" {
        return Some(node_text(node, source).to_string());
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_identifier(&child, source) {
            return Some(found);
        }
    }
    None
}

pub(crate) fn all() -> Vec<LanguageStrategy> {
    vec![
        LanguageStrategy {
            tag: "rust",
            extensions: &[".rs"],
            language: || tree_sitter_rust::LANGUAGE.into(),
            chunk_methods: true,
            classify: rust_classify,
            extract_metadata: rust_metadata,
        },
        LanguageStrategy {
            tag: "python",
            extensions: &[".py", ".pyi"],
            language: || tree_sitter_python::LANGUAGE.into(),
            chunk_methods: true,
            classify: python_classify,
            extract_metadata: python_metadata,
        },
        LanguageStrategy {
            tag: "javascript",
            extensions: &[".js", ".jsx", ".mjs", ".cjs"],
            language: || tree_sitter_javascript::LANGUAGE.into(),
            chunk_methods: true,
            classify: js_classify,
            extract_metadata: |n, s, p| js_metadata(n, s, p, "javascript"),
        },
        LanguageStrategy {
            tag: "typescript",
            extensions: &[".ts", ".tsx"],
            language: || tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            chunk_methods: true,
            classify: js_classify,
            extract_metadata: |n, s, p| js_metadata(n, s, p, "typescript"),
        },
        LanguageStrategy {
            tag: "java",
            extensions: &[".java"],
            language: || tree_sitter_java::LANGUAGE.into(),
            chunk_methods: true,
            classify: java_classify,
            extract_metadata: java_metadata,
        },
        LanguageStrategy {
            tag: "go",
            extensions: &[".go"],
            language: || tree_sitter_go::LANGUAGE.into(),
            chunk_methods: false,
            classify: go_classify,
            extract_metadata: go_metadata,
        },
        LanguageStrategy {
            tag: "c",
            extensions: &[".c", ".h"],
            language: || tree_sitter_c::LANGUAGE.into(),
            chunk_methods: false,
            classify: c_classify,
            extract_metadata: |n, s, p| c_metadata(n, s, p, "c"),
        },
        LanguageStrategy {
            tag: "cpp",
            extensions: &[".cpp", ".cc", ".cxx", ".hpp", ".hh"],
            language: || tree_sitter_cpp::LANGUAGE.into(),
            chunk_methods: true,
            classify: c_classify,
            extract_metadata: |n, s, p| c_metadata(n, s, p, "cpp"),
        },
    ]
}
