//! Error and warning types for the chunking engine

use thiserror::Error;

/// Fatal errors that abort a `chunk` call
///
/// Non-fatal parsing problems never construct a `ChunkError`; they are
/// appended to [`crate::chunk::ChunkResult::warnings`] instead and the call
/// still returns `Ok`.
#[derive(Debug, Error)]
pub enum ChunkError {
    /// The caller's cancellation token fired before the call completed.
    #[error("chunking cancelled")]
    Cancelled,

    /// A DOCX/ODT input was not a valid ZIP archive, or a required inner
    /// part (`word/document.xml`, `content.xml`, `word/styles.xml`, ...)
    /// was missing.
    #[error("invalid container: {0}")]
    ContainerInvalid(String),

    /// Notebook input was not valid JSON, or lacked the minimal notebook
    /// structure (a `cells` array).
    #[error("invalid notebook: {0}")]
    NotebookInvalid(String),

    /// Defensive I/O error surfaced while reading an inner container part.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A non-fatal diagnostic raised while chunking
///
/// Pushed to [`crate::chunk::ChunkResult::warnings`]; never aborts the call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChunkWarning {
    /// Best-effort byte offset into the original content where the issue
    /// was detected.
    pub offset: usize,
    /// Human-readable description.
    pub message: String,
    /// Stable machine code, e.g. `"XML_PARSE_ERROR"`, `"OVERSIZE_LINE"`.
    pub code: &'static str,
}

impl ChunkWarning {
    /// Construct a new warning.
    pub fn new(offset: usize, message: impl Into<String>, code: &'static str) -> Self {
        Self {
            offset,
            message: message.into(),
            code,
        }
    }
}
