//! Generic plain-text fallback chunker
//!
//! Invoked by the registry when no format-specific strategy accepts the
//! input, and by format chunkers that choose to degrade on a parse failure.

use crate::cancel::CancellationToken;
use crate::chunk::{Chunk, ChunkResult};
use crate::chunker::splitter::split_oversized;
use crate::chunker::Chunker;
use crate::error::{ChunkError, ChunkWarning};
use crate::metadata::ChunkMetadata;
use crate::options::ChunkOptions;
use crate::tokenizer::count_tokens;

/// Splits content on blank-line/paragraph boundaries subject to
/// `max_chunk_size`, tagging every chunk `unknown` with no structural
/// payload. The chunker of last resort.
#[derive(Debug, Default)]
pub struct TextChunker;

impl TextChunker {
    pub fn new() -> Self {
        Self
    }
}

impl Chunker for TextChunker {
    fn name(&self) -> &'static str {
        "plain-text fallback"
    }

    fn priority(&self) -> i32 {
        0
    }

    fn can_handle(&self, _mime: Option<&str>, _language_hint: Option<&str>) -> bool {
        true
    }

    fn chunk(
        &self,
        content: &[u8],
        options: &ChunkOptions,
        cancel: &CancellationToken,
    ) -> Result<ChunkResult, ChunkError> {
        let text = String::from_utf8_lossy(content);
        let mut warnings: Vec<ChunkWarning> = Vec::new();
        let mut chunks = Vec::new();

        if !text.is_empty() {
            let pieces = split_oversized(
                &text,
                options.max_chunk_size,
                options.overlap,
                0,
                &mut warnings,
            );
            for (index, piece) in pieces.into_iter().enumerate() {
                if cancel.is_cancelled() {
                    return Err(ChunkError::Cancelled);
                }
                let token_estimate = count_tokens(&piece.content);
                chunks.push(Chunk {
                    index,
                    start_offset: piece.start_in_unit,
                    end_offset: piece.end_in_unit,
                    content: piece.content,
                    metadata: ChunkMetadata::unknown(token_estimate),
                });
            }
        }

        Ok(ChunkResult::new(chunks, warnings, self.name(), content.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_yields_zero_chunks() {
        let chunker = TextChunker::new();
        let result = chunker
            .chunk(b"", &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 0);
        assert_eq!(result.original_size, 0);
        assert_eq!(result.chunker_used, "plain-text fallback");
    }

    #[test]
    fn always_can_handle() {
        let chunker = TextChunker::new();
        assert!(chunker.can_handle(None, None));
        assert!(chunker.can_handle(Some("anything/whatsoever"), Some("file.xyz")));
    }

    #[test]
    fn splits_long_text_into_multiple_chunks() {
        let chunker = TextChunker::new();
        let mut options = ChunkOptions::default();
        options.max_chunk_size = 20;
        options.overlap = 0;
        let text = "first paragraph\n\nsecond paragraph\n\nthird paragraph";
        let result = chunker
            .chunk(text.as_bytes(), &options, &CancellationToken::new())
            .unwrap();
        assert!(result.total_chunks > 1);
        assert_eq!(result.total_chunks, result.chunks.len());
    }
}
