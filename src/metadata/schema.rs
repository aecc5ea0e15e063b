//! Metadata for schema-definition chunks (Protobuf / GraphQL)

use serde::{Deserialize, Serialize};

/// The declaration kind a schema chunk was extracted from.
///
/// Protobuf contributes `message`/`service`/`enum`; GraphQL contributes
/// `type`/`input`/`interface`/`union`/`enum`/`scalar`/`directive`/`schema`.
/// `extend` marks a GraphQL `extend type ...` block; `preamble` marks a
/// leading run of `syntax`/`package`/`import` statements kept together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Type,
    Input,
    Interface,
    Union,
    Enum,
    Scalar,
    Message,
    Service,
    Directive,
    Schema,
    Preamble,
    Extend,
}

/// Metadata describing one Protobuf or GraphQL top-level declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaMetadata {
    /// Present for Protobuf `message` declarations and `rpc` containers.
    pub message_name: Option<String>,
    /// Present for Protobuf `service` / GraphQL root-operation declarations.
    pub service_name: Option<String>,
    pub rpc_name: Option<String>,
    /// Present for GraphQL `type`/`input`/`interface`/... declarations.
    pub type_name: Option<String>,
    pub type_kind: TypeKind,
}
