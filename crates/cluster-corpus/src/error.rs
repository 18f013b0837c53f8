//! Error types for corpus and workload generation.

use cluster_topology::NodeId;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// Corpus parameters are inconsistent
    #[error("Invalid corpus configuration: {0}")]
    InvalidConfig(String),

    /// Block size would produce zero-block files
    #[error("Block size {block_size} KiB is outside 1..={max} KiB and would produce degenerate files")]
    DegenerateBlockSize { block_size: u64, max: u64 },

    /// Two generated files drew the same name
    #[error("Generated file name collision: {0}")]
    NameCollision(String),

    /// Storage nodes exist but there is nothing to assign
    #[error("Corpus is empty but {0} storage node(s) need access targets")]
    EmptyCorpus(usize),

    /// An assignment references a file missing from the corpus
    #[error("Node {node} targets '{file}', which is not in the corpus")]
    MissingTarget { node: NodeId, file: String },

    /// An assignment lists the same file twice
    #[error("Node {node} targets '{file}' more than once")]
    DuplicateTarget { node: NodeId, file: String },

    /// An assignment has no targets
    #[error("Node {0} has no access targets")]
    EmptyTargets(NodeId),

    /// A materialized file does not match its block count
    #[error("Corpus file '{name}' is {actual} bytes, expected {expected}")]
    SizeMismatch {
        name: String,
        expected: u64,
        actual: u64,
    },

    /// Filesystem failure
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document could not be parsed or rendered
    #[error("YAML error for {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl CorpusError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CorpusError::Io {
            path: path.into(),
            source,
        }
    }
}
