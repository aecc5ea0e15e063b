//! Cross-cutting invariants that hold for every chunker the registry can
//! dispatch to: chunk count/index bookkeeping, empty-input behavior, and
//! cancellation.

use chunk_engine::{CancellationToken, ChunkOptions, ChunkerRegistry};

fn registry() -> ChunkerRegistry {
    ChunkerRegistry::default()
}

#[test]
fn total_chunks_matches_chunk_vec_len() {
    let registry = registry();
    let text = "# Heading\n\nSome body text that is not empty at all.\n";
    let result = registry
        .chunk(
            text.as_bytes(),
            &ChunkOptions::default(),
            None,
            Some("doc.md"),
            &CancellationToken::new(),
        )
        .unwrap();
    assert_eq!(result.total_chunks, result.chunks.len());
}

#[test]
fn chunk_indices_are_dense_and_sequential() {
    let registry = registry();
    let mut options = ChunkOptions::default();
    options.max_chunk_size = 30;
    let text = "one two three four five\n\nsix seven eight nine ten\n\neleven twelve thirteen";
    let result = registry
        .chunk(text.as_bytes(), &options, None, None, &CancellationToken::new())
        .unwrap();
    for (i, chunk) in result.chunks.iter().enumerate() {
        assert_eq!(chunk.index, i);
    }
}

#[test]
fn empty_content_yields_zero_chunks_with_original_size_zero() {
    let registry = registry();
    let result = registry
        .chunk(b"", &ChunkOptions::default(), None, Some("notes.md"), &CancellationToken::new())
        .unwrap();
    assert_eq!(result.total_chunks, 0);
    assert_eq!(result.original_size, 0);
    assert!(!result.chunker_used.is_empty());
}

#[test]
fn original_size_matches_input_byte_length() {
    let registry = registry();
    let text = "hello world, this is some plain content";
    let result = registry
        .chunk(text.as_bytes(), &ChunkOptions::default(), None, None, &CancellationToken::new())
        .unwrap();
    assert_eq!(result.original_size, text.len());
}

#[test]
fn cancelled_token_aborts_with_cancelled_error() {
    let registry = registry();
    let token = CancellationToken::new();
    token.cancel();
    let text = "# Title\n\nbody\n\n## Sub\n\nmore body here to iterate over";
    let err = registry
        .chunk(text.as_bytes(), &ChunkOptions::default(), None, Some("doc.md"), &token)
        .unwrap_err();
    assert!(matches!(err, chunk_engine::ChunkError::Cancelled));
}

#[test]
fn non_empty_chunks_have_end_offset_past_start_offset() {
    let registry = registry();
    let text = "first paragraph of real content\n\nsecond paragraph of real content";
    let result = registry
        .chunk(text.as_bytes(), &ChunkOptions::default(), None, None, &CancellationToken::new())
        .unwrap();
    for chunk in &result.chunks {
        if !chunk.content.is_empty() {
            assert!(chunk.end_offset > chunk.start_offset);
        }
    }
}

#[test]
fn warnings_are_json_serializable() {
    let registry = registry();
    let malformed_json = "{not valid json at all";
    let result = registry
        .chunk(
            malformed_json.as_bytes(),
            &ChunkOptions::default(),
            None,
            Some("data.json"),
            &CancellationToken::new(),
        )
        .unwrap();
    for warning in &result.warnings {
        let encoded = serde_json::to_string(warning).expect("ChunkWarning must serialize");
        assert!(encoded.contains("code"));
    }
}
