//! Deployment artifact generation for cluster-gen.
//!
//! Compiles a [`cluster_topology::Topology`] into the documents needed to
//! bring the cluster up on its physical hosts:
//!
//! - one Docker Compose file per host, with one service per logical node
//! - one inventory listing every distinct host once, for remote execution
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────┐
//!                 │   Topology   │
//!                 └──────┬───────┘
//!            ┌───────────┴───────────┐
//!            ▼                       ▼
//!   ┌────────────────┐      ┌─────────────────┐
//!   │ Docker Compose │      │    Inventory    │
//!   │   Generator    │      │    Generator    │
//!   └────────────────┘      └─────────────────┘
//!            │                       │
//!            ▼                       ▼
//!   compose_<host>.yml        gen_ansible.ini
//! ```

pub mod config;
pub mod error;
pub mod generator;

pub use config::*;
pub use error::DeployError;
pub use generator::*;
