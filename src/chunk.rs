//! The `Chunk` and `ChunkResult` record types

use crate::error::ChunkWarning;
use crate::metadata::ChunkMetadata;

/// One immutable piece of a chunked input
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Chunk {
    /// Zero-based position within its `ChunkResult`. Dense, gap-free.
    pub index: usize,
    /// The textual bytes of this chunk, exactly as a consumer will see them.
    pub content: String,
    /// Half-open byte range into the original input, best effort (see the
    /// engine's offset-fidelity notes). `end_offset > start_offset` holds
    /// for every non-empty chunk.
    pub start_offset: usize,
    pub end_offset: usize,
    pub metadata: ChunkMetadata,
}

/// The output of a single `chunk` call
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ChunkResult {
    pub chunks: Vec<Chunk>,
    /// Non-fatal parsing issues encountered while chunking.
    pub warnings: Vec<ChunkWarning>,
    pub total_chunks: usize,
    /// The `name` of the chunker that produced this result.
    pub chunker_used: &'static str,
    /// Length in bytes of the original input.
    pub original_size: usize,
}

impl ChunkResult {
    /// Assemble a result from a finished chunk list, stamping `total_chunks`
    /// from the list itself so the two can never disagree.
    pub fn new(
        chunks: Vec<Chunk>,
        warnings: Vec<ChunkWarning>,
        chunker_used: &'static str,
        original_size: usize,
    ) -> Self {
        Self {
            total_chunks: chunks.len(),
            chunks,
            warnings,
            chunker_used,
            original_size,
        }
    }
}
