//! Metadata for build-manifest chunks (Dockerfile stages and similar)

use serde::{Deserialize, Serialize};

/// Metadata describing one build target or container-image stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildMetadata {
    pub target_name: Option<String>,
    pub dependencies: Vec<String>,
    pub stage_name: Option<String>,
    pub base_image: Option<String>,
}
