//! Synthetic corpus generator for cluster-gen.
//!
//! This crate provides the [`CorpusGenerator`], which derives a set of
//! block-quantized files and a per-node access workload from a single seed.
//! The generator owns one seeded RNG that is threaded through both steps, so
//! the same seed always yields the same file names, block counts and
//! assignments.
//!
//! # Architecture
//!
//! ```text
//! Topology (seed, block_size, fs nodes)
//!        │
//!        ▼
//! ┌──────────────────┐
//! │ CorpusGenerator  │
//! │                  │
//! │  - seed          │
//! │  - rng (StdRng)  │
//! └────────┬─────────┘
//!          │
//!    ┌─────┴──────────────┐
//!    ▼                    ▼
//!  Corpus ──────────► Workload
//!  (file_map)         (node id → {access, targets})
//!    │
//!    ▼
//!  materialized files (entropy or seeded content)
//! ```
//!
//! # Example
//!
//! ```rust
//! use cluster_corpus::{CorpusConfig, CorpusGenerator};
//!
//! let mut generator = CorpusGenerator::new(42, CorpusConfig::default());
//! let corpus = generator.generate_corpus(64).unwrap();
//! assert_eq!(corpus.files.len(), 10);
//! ```

pub mod content;
pub mod corpus;
pub mod error;
pub mod generator;
pub mod workload;

// Re-exports for convenience
pub use content::{check_materialized, materialize_corpus, ContentSource, MaterializeStats};
pub use corpus::{generate_corpus, load_file_map, Corpus, CorpusConfig, FileMap, FileSpec};
pub use error::CorpusError;
pub use generator::CorpusGenerator;
pub use workload::{
    assign_workload, check_referential_integrity, load_workload, workload_to_yaml, AccessAssignment,
    AccessPattern, Workload,
};
