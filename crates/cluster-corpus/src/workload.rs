//! Per-node access workload assignment.

use crate::corpus::{Corpus, FileMap};
use crate::error::CorpusError;
use cluster_topology::{NodeId, Topology};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// How a storage node walks its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPattern {
    /// Read every target sequentially, forever
    Loop,
    /// Read every target with several concurrent block readers
    LoopParallel,
    /// Read random blocks of random targets
    Random,
}

impl AccessPattern {
    pub const ALL: [AccessPattern; 3] = [
        AccessPattern::Loop,
        AccessPattern::LoopParallel,
        AccessPattern::Random,
    ];
}

impl std::fmt::Display for AccessPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessPattern::Loop => write!(f, "loop"),
            AccessPattern::LoopParallel => write!(f, "loop_parallel"),
            AccessPattern::Random => write!(f, "random"),
        }
    }
}

/// Access pattern and target files of one storage node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessAssignment {
    #[serde(rename = "access")]
    pub pattern: AccessPattern,
    pub targets: Vec<String>,
}

/// `node id → assignment`, the on-disk `user` document.
pub type Workload = BTreeMap<NodeId, AccessAssignment>;

/// Assign a pattern and a non-empty target subset to every storage node.
///
/// Nodes are visited in id order. The result is checked against the corpus
/// before it is returned.
pub fn assign_workload<R: Rng>(
    rng: &mut R,
    topology: &Topology,
    corpus: &Corpus,
) -> Result<Workload, CorpusError> {
    let names = corpus.names();
    let fs_nodes: Vec<NodeId> = topology.fs_nodes().map(|node| node.id).collect();

    if names.is_empty() && !fs_nodes.is_empty() {
        return Err(CorpusError::EmptyCorpus(fs_nodes.len()));
    }

    let mut workload = Workload::new();
    for node in fs_nodes {
        let count = rng.random_range(1..=names.len());
        let targets = index::sample(rng, names.len(), count)
            .into_iter()
            .map(|i| names[i].to_string())
            .collect();
        let pattern = AccessPattern::ALL[rng.random_range(0..AccessPattern::ALL.len())];

        workload.insert(node, AccessAssignment { pattern, targets });
    }

    check_referential_integrity(&corpus.file_map(), &workload)?;
    Ok(workload)
}

/// Every assignment must have at least one target, no repeated targets, and
/// only targets present in `file_map`.
pub fn check_referential_integrity(
    file_map: &FileMap,
    workload: &Workload,
) -> Result<(), CorpusError> {
    for (&node, assignment) in workload {
        if assignment.targets.is_empty() {
            return Err(CorpusError::EmptyTargets(node));
        }

        let mut seen = HashSet::with_capacity(assignment.targets.len());
        for target in &assignment.targets {
            if !file_map.contains_key(target) {
                return Err(CorpusError::MissingTarget {
                    node,
                    file: target.clone(),
                });
            }
            if !seen.insert(target.as_str()) {
                return Err(CorpusError::DuplicateTarget {
                    node,
                    file: target.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Render the workload document.
pub fn workload_to_yaml(workload: &Workload) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(workload)
}

/// Read a workload document.
pub fn load_workload(path: &Path) -> Result<Workload, CorpusError> {
    let content = std::fs::read_to_string(path).map_err(|e| CorpusError::io(path, e))?;
    serde_yaml::from_str(&content).map_err(|source| CorpusError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}
