//! Table-driven dispatch scenarios: given a filename hint and a minimal
//! sample of that format, the registry must select the chunker the
//! priority table names.

use chunk_engine::{CancellationToken, ChunkOptions, ChunkerRegistry};
use rstest::rstest;

#[rstest]
#[case("notes.md", "# Title\n\nSome body text.\n", "markdown")]
#[case("doc.adoc", "= Title\n\nSome body text.\n", "asciidoc")]
#[case("doc.rst", "Title\n=====\n\nSome body text.\n", "rst")]
#[case("page.html", "<html><body><h1>Title</h1><p>Body</p></body></html>", "html")]
#[case("data.json", r#"{"a": 1, "b": 2}"#, "json")]
#[case("data.xml", "<root><child>value</child></root>", "xml")]
#[case("main.tf", "resource \"aws_instance\" \"web\" {\n  ami = \"abc\"\n}\n", "hcl")]
#[case("schema.proto", "syntax = \"proto3\";\nmessage Foo { string bar = 1; }\n", "protobuf")]
#[case("schema.graphql", "type Query { hello: String }\n", "graphql")]
#[case("query.sql", "SELECT * FROM users WHERE id = 1;\n", "sql")]
#[case("app.log", "2024-01-01 10:00:00 INFO started up\n", "log")]
#[case("main.rs", "fn add(a: i32, b: i32) -> i32 { a + b }\n", "code-rust")]
#[case("main.py", "def add(a, b):\n    return a + b\n", "code-python")]
#[case("main.go", "package main\n\nfunc Add(a int, b int) int {\n\treturn a + b\n}\n", "code-go")]
#[case("random.xyz", "just some plain unstructured text", "plain-text fallback")]
fn dispatches_to_expected_chunker(#[case] filename: &str, #[case] sample: &str, #[case] expected: &str) {
    let registry = ChunkerRegistry::default();
    let result = registry
        .chunk(
            sample.as_bytes(),
            &ChunkOptions::default(),
            None,
            Some(filename),
            &CancellationToken::new(),
        )
        .unwrap();
    assert_eq!(result.chunker_used, expected, "filename={filename}");
}

#[test]
fn notebook_dispatches_over_json_for_ipynb_extension() {
    let registry = ChunkerRegistry::default();
    let notebook = r#"{"cells": [{"cell_type": "markdown", "source": ["# hi"]}], "metadata": {}}"#;
    let result = registry
        .chunk(
            notebook.as_bytes(),
            &ChunkOptions::default(),
            None,
            Some("analysis.ipynb"),
            &CancellationToken::new(),
        )
        .unwrap();
    assert_eq!(result.chunker_used, "notebook");
}

#[test]
fn mime_type_hint_alone_is_sufficient_to_dispatch() {
    let registry = ChunkerRegistry::default();
    let result = registry
        .chunk(
            br#"{"a": 1}"#,
            &ChunkOptions::default(),
            Some("application/json"),
            None,
            &CancellationToken::new(),
        )
        .unwrap();
    assert_eq!(result.chunker_used, "json");
}
