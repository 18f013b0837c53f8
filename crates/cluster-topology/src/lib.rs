//! Core topology types for cluster-gen.
//!
//! This crate provides the canonical description of a cluster that every
//! other cluster-gen crate consumes:
//!
//! - [`Node`] - A logical node bound to `host:port` with a capability set
//! - [`Capability`] - Closed set of node capability tags
//! - [`Topology`] - All nodes plus the corpus generation parameters
//! - [`HostGroup`] - Nodes sharing one physical host
//!
//! # Architecture
//!
//! ```text
//! cluster-topology (this crate)
//!    │
//!    ├─── cluster-deploy   (per-host compose files, inventory)
//!    │
//!    └─── cluster-corpus   (synthetic corpus, access workload)
//! ```
//!
//! # Example
//!
//! ```rust
//! use cluster_topology::Topology;
//!
//! let topology = Topology::from_yaml(r#"
//! nodes:
//!   1:
//!     addr: "10.0.0.1:7000"
//!     spec: [fs]
//!   2:
//!     addr: "10.0.0.1:7002"
//!     spec: []
//! random_seed: 42
//! block_size: 64
//! "#).unwrap();
//!
//! assert_eq!(topology.host_groups().len(), 1);
//! ```

pub mod node;
pub mod topology;

// Re-exports for convenience
pub use node::{parse_addr, Capability, Node, NodeId};
pub use topology::{HostGroup, Topology, TopologyError};
