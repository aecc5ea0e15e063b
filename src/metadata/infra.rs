//! Metadata for infrastructure-as-code (HCL/Terraform) chunks

use serde::{Deserialize, Serialize};

/// The HCL top-level block kind a chunk was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Resource,
    Data,
    Variable,
    Output,
    Module,
    Provider,
}

/// Metadata describing one HCL top-level block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfraMetadata {
    /// Present for `resource`/`data` blocks (e.g. `"aws_instance"`).
    pub resource_type: Option<String>,
    pub resource_name: Option<String>,
    pub block_type: BlockType,
}
