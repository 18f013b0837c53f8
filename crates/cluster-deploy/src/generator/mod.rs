//! Deployment document generators.
//!
//! This module provides generators for per-host Docker Compose files and the
//! remote-execution inventory.

pub mod docker_compose;
pub mod inventory;

use crate::error::DeployError;
use cluster_topology::Topology;

/// A rendered document ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    /// File name relative to the deploy output directory
    pub filename: String,
    /// Full document content
    pub content: String,
}

/// Trait for deployment document generators.
pub trait DocumentGenerator {
    /// Generate every document for the topology.
    ///
    /// Either all documents are returned or none are.
    fn generate(&self, topology: &Topology) -> Result<Vec<GeneratedDocument>, DeployError>;
}

pub use docker_compose::{
    compile_descriptors, is_descriptor_filename, DeploymentDescriptor, DockerComposeGenerator,
};
pub use inventory::{compile_inventory, Inventory, InventoryEntry, InventoryGenerator};
