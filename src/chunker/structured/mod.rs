//! Grammar-aware chunkers that emit one chunk per top-level structural unit

mod graphql;
mod hcl;
mod json;
mod protobuf;
mod sql;
mod xml;

pub use graphql::GraphQlChunker;
pub use hcl::HclChunker;
pub use json::JsonChunker;
pub use protobuf::ProtobufChunker;
pub use sql::SqlChunker;
pub use xml::XmlChunker;
