//! Heading-driven sectionizing shared by Markdown, AsciiDoc, RST, and HTML

mod asciidoc;
mod heading_stack;
mod html;
mod markdown;
mod rst;

pub use asciidoc::AsciiDocChunker;
pub use html::HtmlChunker;
pub use markdown::MarkdownChunker;
pub use rst::RstChunker;

pub(crate) use heading_stack::{HeadingStack, Section};

use crate::chunk::Chunk;
use crate::chunker::splitter::split_oversized;
use crate::error::ChunkWarning;
use crate::metadata::{ChunkMetadata, ContentKind, DocumentMetadata, ExtractionQuality};
use crate::options::ChunkOptions;
use crate::tokenizer::count_tokens;

/// Turn finished `Section`s into `Chunk`s, running each through the size
/// splitter and stamping every sub-chunk with the section's `Document`
/// metadata (heading/level/section_path carried onto every split piece).
pub(crate) fn sections_to_chunks(
    sections: Vec<Section>,
    kind: ContentKind,
    options: &ChunkOptions,
    warnings: &mut Vec<ChunkWarning>,
) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for section in sections {
        let pieces = split_oversized(
            &section.content,
            options.max_chunk_size,
            options.overlap,
            section.start_offset,
            warnings,
        );
        for piece in pieces {
            let word_count = piece.content.split_whitespace().count();
            let has_code_block = piece.content.contains("```") || piece.content.contains("----");
            let doc_meta = DocumentMetadata {
                heading: section.heading.clone(),
                heading_level: section.heading_level,
                section_path: section.section_path.clone(),
                word_count,
                has_code_block,
                is_table: section.is_table,
                extraction_quality: ExtractionQuality::High,
                ..Default::default()
            };
            let token_estimate = count_tokens(&piece.content);
            chunks.push(Chunk {
                index: 0,
                start_offset: piece.start_in_unit,
                end_offset: piece.end_in_unit,
                content: piece.content,
                metadata: ChunkMetadata::document(kind, token_estimate, doc_meta),
            });
        }
    }
    for (i, chunk) in chunks.iter_mut().enumerate() {
        chunk.index = i;
    }
    chunks
}
