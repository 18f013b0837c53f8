//! Error types for deployment generation.

use cluster_topology::TopologyError;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Topology violates an invariant (port conflict, overflow, ...)
    #[error("Conflicting deployment configuration: {0}")]
    Conflict(#[from] TopologyError),

    /// Two services with the same name would land in one descriptor
    #[error("Duplicate service '{service}' on host {host}")]
    DuplicateService { host: String, service: String },

    /// Two hosts would be written to the same descriptor file
    #[error("Hosts {first} and {second} both map to descriptor file {filename}")]
    FilenameCollision {
        filename: String,
        first: String,
        second: String,
    },

    /// Project name cannot scope images and paths
    #[error("Invalid project name '{0}': use lowercase letters, digits, '-', '_' or '.'")]
    InvalidProjectName(String),

    /// Descriptor could not be serialized
    #[error("Failed to serialize descriptor: {0}")]
    Serialize(#[from] serde_yaml::Error),
}
