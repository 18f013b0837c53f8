//! Command handlers.

mod all;
mod corpus;
mod deploy;
mod verify;

pub use all::run_all;
pub use corpus::run_corpus;
pub use deploy::run_deploy;
pub use verify::run_verify;

use anyhow::Context;
use cluster_topology::Topology;
use std::path::Path;

/// Load and validate the topology file.
pub(crate) fn load_topology(path: &Path) -> anyhow::Result<Topology> {
    let topology = Topology::from_file(path)
        .with_context(|| format!("Failed to load topology: {}", path.display()))?;
    tracing::info!(
        "Loaded topology: {} node(s) on {} host(s), seed={}, block_size={}",
        topology.len(),
        topology.hosts().len(),
        topology.seed,
        topology.block_size
    );
    Ok(topology)
}
