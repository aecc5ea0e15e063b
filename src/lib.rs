//! Format-aware content chunking engine
//!
//! Splits a buffer into bounded, semantically annotated chunks for
//! retrieval and embedding pipelines. A [`ChunkerRegistry`] dispatches each
//! call to the format-specific strategy best suited to the input's MIME
//! type and/or filename hint; every strategy shares the same size-bounding
//! splitter and tagged [`ChunkMetadata`] model.
//!
//! # Example
//!
//! ```ignore
//! use chunk_engine::{CancellationToken, ChunkOptions, ChunkerRegistry};
//!
//! let registry = ChunkerRegistry::default();
//! let options = ChunkOptions::default();
//! let result = registry.chunk(
//!     b"# Title\n\nSome body text.",
//!     &options,
//!     None,
//!     Some("notes.md"),
//!     &CancellationToken::new(),
//! )?;
//! # Ok::<(), chunk_engine::ChunkError>(())
//! ```

pub mod cancel;
pub mod chunk;
pub mod chunker;
pub mod error;
pub mod metadata;
pub mod options;
pub mod tokenizer;

pub use cancel::CancellationToken;
pub use chunk::{Chunk, ChunkResult};
pub use chunker::{Chunker, ChunkerRegistry};
pub use error::{ChunkError, ChunkWarning};
pub use metadata::ChunkMetadata;
pub use options::ChunkOptions;
pub use tokenizer::count_tokens;
