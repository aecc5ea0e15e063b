//! The format strategy contract, dispatcher, and shared splitting utility

pub mod code;
pub mod log;
pub mod notebook;
pub mod office;
pub mod prose;
pub mod registry;
pub mod splitter;
pub mod structured;
pub mod text;

pub use registry::ChunkerRegistry;

use crate::cancel::CancellationToken;
use crate::chunk::ChunkResult;
use crate::error::ChunkError;
use crate::options::ChunkOptions;

/// A format-specific chunking strategy
///
/// Implementations own the full parse-and-split logic for one format;
/// there is no shared intermediate document model between them.
pub trait Chunker: Send + Sync {
    /// Stable, lowercase identifier reported as `ChunkResult::chunker_used`.
    fn name(&self) -> &'static str;

    /// Tie-breaking priority; higher wins when more than one chunker's
    /// `can_handle` accepts the same input. Fixed per strategy.
    fn priority(&self) -> i32;

    /// Whether this strategy should handle input carrying the given MIME
    /// type and/or filename/language hint. A chunker accepts if either
    /// signal matches its own set; callers needn't supply both.
    fn can_handle(&self, mime: Option<&str>, language_hint: Option<&str>) -> bool;

    /// Parse `content` and produce a `ChunkResult`.
    fn chunk(
        &self,
        content: &[u8],
        options: &ChunkOptions,
        cancel: &CancellationToken,
    ) -> Result<ChunkResult, ChunkError>;
}

/// Case-insensitive suffix match against a dot-prefixed extension list,
/// e.g. `matches_extension("Notes.MD", &[".md", ".markdown"])`.
pub(crate) fn matches_extension(hint: &str, extensions: &[&str]) -> bool {
    let hint = hint.to_ascii_lowercase();
    extensions.iter().any(|ext| hint.ends_with(ext))
}
