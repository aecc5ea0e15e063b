//! The tagged `ChunkMetadata` union and its per-format payload records
//!
//! Every [`crate::chunk::Chunk`] carries a [`ChunkMetadata`]: a
//! content-kind tag, a token estimate, and exactly one populated payload
//! variant. Using a Rust `enum` for the payload makes "exactly one variant
//! populated" a property of the type rather than a convention every
//! chunker has to uphold by hand.

mod build;
mod code;
mod document;
mod infra;
mod log;
mod notebook;
mod schema;
mod sql;
mod structured;

pub use build::BuildMetadata;
pub use code::{CodeFlags, CodeMetadata, Visibility};
pub use document::{DocumentMetadata, ExtractionQuality};
pub use infra::{BlockType, InfraMetadata};
pub use log::{LogFormat, LogLevel, LogMetadata};
pub use notebook::{CellType, NotebookMetadata};
pub use schema::{SchemaMetadata, TypeKind};
pub use sql::SqlMetadata;
pub use structured::StructuredMetadata;

use serde::{Deserialize, Serialize};

/// The coarse rendering/content class of a chunk
///
/// Orthogonal to [`MetadataPayload`]: a notebook code cell, for instance,
/// carries `ContentKind::Code` alongside a [`MetadataPayload::Notebook`]
/// payload, not a `MetadataPayload::Code` one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Code,
    Markdown,
    Prose,
    Structured,
    Unknown,
}

/// The per-format metadata payload
///
/// Exactly one variant is ever constructed for a given chunk; cross-variant
/// fields are structurally absent rather than merely null.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "variant", content = "data")]
pub enum MetadataPayload {
    Code(CodeMetadata),
    Document(DocumentMetadata),
    Notebook(NotebookMetadata),
    Build(BuildMetadata),
    Infra(InfraMetadata),
    Schema(SchemaMetadata),
    Structured(StructuredMetadata),
    Sql(SqlMetadata),
    Log(LogMetadata),
    /// No structural metadata beyond offsets/tokens (plain-text fallback).
    None,
}

/// Metadata attached to every produced chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub kind: ContentKind,
    pub token_estimate: usize,
    pub payload: MetadataPayload,
}

impl ChunkMetadata {
    /// Construct metadata with no structural payload (plain-text fallback).
    pub fn unknown(token_estimate: usize) -> Self {
        Self {
            kind: ContentKind::Unknown,
            token_estimate,
            payload: MetadataPayload::None,
        }
    }

    /// Construct metadata for a code chunk.
    pub fn code(token_estimate: usize, payload: CodeMetadata) -> Self {
        Self {
            kind: ContentKind::Code,
            token_estimate,
            payload: MetadataPayload::Code(payload),
        }
    }

    /// Construct metadata for a document (prose/markdown) chunk.
    pub fn document(kind: ContentKind, token_estimate: usize, payload: DocumentMetadata) -> Self {
        debug_assert!(matches!(kind, ContentKind::Markdown | ContentKind::Prose));
        Self {
            kind,
            token_estimate,
            payload: MetadataPayload::Document(payload),
        }
    }

    /// Construct metadata for a notebook cell-group chunk.
    pub fn notebook(kind: ContentKind, token_estimate: usize, payload: NotebookMetadata) -> Self {
        Self {
            kind,
            token_estimate,
            payload: MetadataPayload::Notebook(payload),
        }
    }

    /// Construct metadata for a structured-data chunk.
    pub fn structured(token_estimate: usize, payload: StructuredMetadata) -> Self {
        Self {
            kind: ContentKind::Structured,
            token_estimate,
            payload: MetadataPayload::Structured(payload),
        }
    }

    /// Construct metadata for an infra-as-code (HCL) chunk.
    pub fn infra(token_estimate: usize, payload: InfraMetadata) -> Self {
        Self {
            kind: ContentKind::Structured,
            token_estimate,
            payload: MetadataPayload::Infra(payload),
        }
    }

    /// Construct metadata for a schema (Protobuf/GraphQL) chunk.
    pub fn schema(token_estimate: usize, payload: SchemaMetadata) -> Self {
        Self {
            kind: ContentKind::Structured,
            token_estimate,
            payload: MetadataPayload::Schema(payload),
        }
    }

    /// Construct metadata for a SQL statement chunk.
    pub fn sql(token_estimate: usize, payload: SqlMetadata) -> Self {
        Self {
            kind: ContentKind::Structured,
            token_estimate,
            payload: MetadataPayload::Sql(payload),
        }
    }

    /// Construct metadata for a log chunk.
    pub fn log(token_estimate: usize, payload: LogMetadata) -> Self {
        Self {
            kind: ContentKind::Unknown,
            token_estimate,
            payload: MetadataPayload::Log(payload),
        }
    }

    /// Construct metadata for a build-manifest chunk (Dockerfile-style
    /// stage/target descriptions). No chunker in this engine's registry
    /// currently produces this variant; it is defined for parity with the
    /// full tagged union described by the data model.
    pub fn build(token_estimate: usize, payload: BuildMetadata) -> Self {
        Self {
            kind: ContentKind::Structured,
            token_estimate,
            payload: MetadataPayload::Build(payload),
        }
    }
}
