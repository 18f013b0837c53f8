//! cluster-gen: compiles a cluster topology into deployment and test artifacts.
//!
//! The pipeline has two halves that share only the [`Topology`]:
//!
//! ```text
//!                        node_config.yaml
//!                               │
//!                               ▼
//!                       ┌──────────────┐
//!                       │   Topology   │
//!                       └──────┬───────┘
//!              ┌───────────────┴────────────────┐
//!              ▼                                ▼
//!   ┌─────────────────────┐         ┌──────────────────────┐
//!   │ compose + inventory │         │ corpus + workload    │
//!   │   (cluster-deploy)  │         │   (cluster-corpus)   │
//!   └─────────────────────┘         └──────────────────────┘
//!              │                                │
//!              ▼                                ▼
//!   deploy/compose_<host>.yml        files/file_map.yaml
//!   deploy/gen_ansible.ini           files/user.yaml
//!                                    files/datas/<name>
//! ```
//!
//! Every artifact is computed and validated in memory before anything is
//! written, so a failed run never leaves a partially valid artifact set.
//!
//! ## Quick Start
//!
//! ```bash
//! # Deployment descriptors and inventory
//! cluster-gen deploy --config node_config.yaml --output-dir ./cluster-output
//!
//! # Corpus, file map and per-node workload
//! cluster-gen corpus --config node_config.yaml --content seeded
//!
//! # Check a generated directory against the topology
//! cluster-gen verify --config node_config.yaml --output-dir ./cluster-output
//! ```

pub mod cli;
pub mod commands;
pub mod output;
pub mod pipeline;
pub mod project;

pub use cluster_topology::Topology;
