//! The chunker dispatcher: holds every registered strategy and picks one
//! per call

use tracing::debug;

use crate::cancel::CancellationToken;
use crate::chunk::ChunkResult;
use crate::error::ChunkError;
use crate::options::ChunkOptions;

use super::code::all_code_chunkers;
use super::office::{DocxChunker, OdtChunker};
use super::prose::{AsciiDocChunker, HtmlChunker, MarkdownChunker, RstChunker};
use super::structured::{GraphQlChunker, HclChunker, JsonChunker, ProtobufChunker, SqlChunker, XmlChunker};
use super::text::TextChunker;
use super::{log::LogChunker, notebook::NotebookChunker, Chunker};

/// Holds every registered [`Chunker`], sorted once at construction time by
/// `(priority desc, name asc)`, and dispatches a `chunk` call to the
/// highest-priority strategy whose `can_handle` accepts the input.
pub struct ChunkerRegistry {
    chunkers: Vec<Box<dyn Chunker>>,
}

impl ChunkerRegistry {
    /// Build a registry from an explicit set of chunkers, useful for tests
    /// that want a narrower dispatch surface than the full default set.
    pub fn new(mut chunkers: Vec<Box<dyn Chunker>>) -> Self {
        chunkers.sort_by(|a, b| b.priority().cmp(&a.priority()).then_with(|| a.name().cmp(b.name())));
        Self { chunkers }
    }

    /// Dispatch `content` to the highest-priority chunker that accepts
    /// `mime`/`language_hint`, falling back to the plain-text chunker
    /// (priority 0, always accepts) when nothing else claims the input.
    pub fn chunk(
        &self,
        content: &[u8],
        options: &ChunkOptions,
        mime: Option<&str>,
        language_hint: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<ChunkResult, ChunkError> {
        let chosen = self
            .chunkers
            .iter()
            .find(|c| c.can_handle(mime, language_hint))
            .expect("plain-text fallback chunker always accepts");
        debug!(chunker = chosen.name(), "dispatching to chunker");
        chosen.chunk(content, options, cancel)
    }

    /// The chunkers in dispatch order, highest priority first.
    pub fn chunkers(&self) -> &[Box<dyn Chunker>] {
        &self.chunkers
    }
}

impl Default for ChunkerRegistry {
    fn default() -> Self {
        let mut chunkers: Vec<Box<dyn Chunker>> = vec![
            Box::new(TextChunker::new()),
            Box::new(MarkdownChunker::new()),
            Box::new(AsciiDocChunker::new()),
            Box::new(RstChunker::new()),
            Box::new(HtmlChunker::new()),
            Box::new(JsonChunker::new()),
            Box::new(XmlChunker::new()),
            Box::new(HclChunker::new()),
            Box::new(ProtobufChunker::new()),
            Box::new(GraphQlChunker::new()),
            Box::new(SqlChunker::new()),
            Box::new(LogChunker::new()),
            Box::new(NotebookChunker::new()),
            Box::new(DocxChunker::new()),
            Box::new(OdtChunker::new()),
        ];
        chunkers.extend(all_code_chunkers());
        Self::new(chunkers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_by_extension() {
        let registry = ChunkerRegistry::default();
        let result = registry
            .chunk(
                b"# Title\n\nbody text",
                &ChunkOptions::default(),
                None,
                Some("notes.md"),
                &CancellationToken::new(),
            )
            .unwrap();
        assert_eq!(result.chunker_used, "markdown");
    }

    #[test]
    fn falls_back_to_text_for_unknown_input() {
        let registry = ChunkerRegistry::default();
        let result = registry
            .chunk(b"no structure here", &ChunkOptions::default(), None, None, &CancellationToken::new())
            .unwrap();
        assert_eq!(result.chunker_used, "plain-text fallback");
    }

    #[test]
    fn priorities_are_sorted_descending() {
        let registry = ChunkerRegistry::default();
        let priorities: Vec<i32> = registry.chunkers().iter().map(|c| c.priority()).collect();
        let mut sorted = priorities.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(priorities, sorted);
    }

    #[test]
    fn empty_content_yields_empty_result() {
        let registry = ChunkerRegistry::default();
        let result = registry
            .chunk(b"", &ChunkOptions::default(), None, Some("notes.md"), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 0);
        assert_eq!(result.original_size, 0);
    }
}
