//! Caller-facing configuration for a single `chunk` call

/// Tuning knobs for a chunking call
///
/// The entire configuration surface of this engine: there is no config
/// file format or startup phase, since a `chunk` call owns no persisted
/// state between invocations.
#[derive(Debug, Clone)]
pub struct ChunkOptions {
    /// Soft upper bound on a chunk's byte length. Chunkers that emit
    /// structurally oversized units (a huge function, a huge paragraph)
    /// hand them to the size splitter rather than honoring this as a hard cap.
    pub max_chunk_size: usize,
    /// Soft target for a chunk's estimated token count.
    pub max_tokens: usize,
    /// Bytes of trailing content repeated at the start of the next
    /// sub-chunk when the size splitter divides an oversized unit.
    /// Advisory; not honored between independent top-level structural units.
    pub overlap: usize,
    /// Hint for format detection: typically a filename or bare extension
    /// (e.g. `"notes.md"` or `"md"`).
    pub language: Option<String>,
    /// Hint for format detection, e.g. `"application/json"`.
    pub mime_type: Option<String>,
    /// When true (the default), chunkers prefer structural boundaries
    /// (headings, functions, objects) over raw byte-size splitting.
    pub preserve_structure: bool,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            max_chunk_size: 8000,
            max_tokens: 2000,
            overlap: 200,
            language: None,
            mime_type: None,
            preserve_structure: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let opts = ChunkOptions::default();
        assert_eq!(opts.max_chunk_size, 8000);
        assert_eq!(opts.max_tokens, 2000);
        assert_eq!(opts.overlap, 200);
        assert!(opts.preserve_structure);
        assert!(opts.language.is_none());
        assert!(opts.mime_type.is_none());
    }
}
