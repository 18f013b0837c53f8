//! Topology document loading and validation.
//!
//! The on-disk document looks like:
//!
//! ```yaml
//! nodes:
//!   1:
//!     addr: 10.0.0.1:7000
//!     spec: [fs]
//!   2:
//!     addr: 10.0.0.1:7002
//!     spec: [router]
//! random_seed: 42
//! block_size: 64
//! ```
//!
//! Everything is checked once at load time. A [`Topology`] that came out of
//! [`Topology::from_yaml`] or [`Topology::new`] has unique ids, parseable
//! addresses, and non-overlapping port pairs on every host.

use crate::node::{parse_addr, Capability, Node, NodeId};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for topology operations.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    /// Error reading the topology file
    #[error("Failed to read topology file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML or an unrecognised document shape
    #[error("Failed to parse topology YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Two nodes share an id
    #[error("Duplicate node id: {0}")]
    DuplicateNodeId(NodeId),

    /// A node is stored under a key that differs from its own id
    #[error("Node stored under key {key} has id {id}")]
    NodeIdMismatch { key: NodeId, id: NodeId },

    /// Address is not `host:port`
    #[error("Node {node}: invalid address '{addr}': {reason}")]
    InvalidAddress {
        node: NodeId,
        addr: String,
        reason: String,
    },

    /// Two nodes on the same host claim the same base or secondary port
    #[error(
        "Port conflict on host {host}: node {first} (base port {first_port}) and node {second} (base port {second_port}) overlap"
    )]
    PortConflict {
        host: String,
        first: NodeId,
        first_port: u16,
        second: NodeId,
        second_port: u16,
    },

    /// Base port has no room for the secondary port
    #[error("Node {node}: base port {port} leaves no room for the secondary port")]
    PortOverflow { node: NodeId, port: u16 },

    /// Seed is neither an integer nor a numeric string
    #[error("Invalid random_seed '{0}': expected an unsigned integer")]
    InvalidSeed(String),

    /// Block size must be positive
    #[error("block_size must be greater than zero")]
    InvalidBlockSize,

    /// The caller needs at least one node
    #[error("Topology has no nodes")]
    EmptyTopology,
}

// ============================================================================
// Document Schema
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TopologyDocument {
    #[serde(deserialize_with = "deserialize_node_entries")]
    nodes: Vec<(NodeId, NodeDocument)>,
    random_seed: SeedValue,
    block_size: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeDocument {
    addr: String,
    #[serde(default)]
    spec: Vec<Capability>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeedValue {
    Int(u64),
    Text(String),
}

impl SeedValue {
    fn resolve(self) -> Result<u64, TopologyError> {
        match self {
            SeedValue::Int(seed) => Ok(seed),
            SeedValue::Text(text) => text
                .trim()
                .parse::<u64>()
                .map_err(|_| TopologyError::InvalidSeed(text)),
        }
    }
}

/// Collect map entries without collapsing duplicate keys, so duplicates can
/// be reported by id instead of silently overwritten.
fn deserialize_node_entries<'de, D>(deserializer: D) -> Result<Vec<(NodeId, NodeDocument)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(NodeId, NodeDocument)>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a map of node id to node definition")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

// ============================================================================
// Topology
// ============================================================================

/// Nodes sharing one physical host, in node id order.
#[derive(Debug, Clone)]
pub struct HostGroup<'a> {
    pub host: &'a str,
    pub nodes: Vec<&'a Node>,
}

impl HostGroup<'_> {
    /// Ensure no two nodes on this host claim overlapping `{port, port + 1}`
    /// pairs and that every secondary port fits in a u16.
    pub fn check_ports(&self) -> Result<(), TopologyError> {
        for node in &self.nodes {
            if node.secondary_port().is_none() {
                return Err(TopologyError::PortOverflow {
                    node: node.id,
                    port: node.port,
                });
            }
        }

        let mut by_port = self.nodes.clone();
        by_port.sort_by_key(|node| (node.port, node.id));

        for pair in by_port.windows(2) {
            let (low, high) = (pair[0], pair[1]);
            if high.port - low.port < 2 {
                return Err(TopologyError::PortConflict {
                    host: self.host.to_string(),
                    first: low.id,
                    first_port: low.port,
                    second: high.id,
                    second_port: high.port,
                });
            }
        }

        Ok(())
    }
}

/// The full cluster description.
///
/// Loaded once and never mutated by downstream components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    /// Nodes keyed by id
    pub nodes: BTreeMap<NodeId, Node>,
    /// Seed for corpus and workload generation
    pub seed: u64,
    /// Block size of generated files, in KiB
    pub block_size: u64,
}

impl Topology {
    /// Build and validate a topology from nodes.
    pub fn new(
        nodes: impl IntoIterator<Item = Node>,
        seed: u64,
        block_size: u64,
    ) -> Result<Self, TopologyError> {
        let mut map = BTreeMap::new();
        for node in nodes {
            let id = node.id;
            if map.insert(id, node).is_some() {
                return Err(TopologyError::DuplicateNodeId(id));
            }
        }

        let topology = Self {
            nodes: map,
            seed,
            block_size,
        };
        topology.validate()?;
        Ok(topology)
    }

    /// Load topology from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TopologyError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse topology from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, TopologyError> {
        let document: TopologyDocument = serde_yaml::from_str(yaml)?;
        let seed = document.random_seed.resolve()?;

        let mut nodes = Vec::with_capacity(document.nodes.len());
        for (id, node) in document.nodes {
            let (host, port) =
                parse_addr(&node.addr).map_err(|reason| TopologyError::InvalidAddress {
                    node: id,
                    addr: node.addr.clone(),
                    reason,
                })?;
            nodes.push(Node {
                id,
                host,
                port,
                capabilities: node.spec.into_iter().collect(),
            });
        }

        Self::new(nodes, seed, document.block_size)
    }

    /// Check every invariant of the topology.
    pub fn validate(&self) -> Result<(), TopologyError> {
        if self.block_size == 0 {
            return Err(TopologyError::InvalidBlockSize);
        }

        for (key, node) in &self.nodes {
            if *key != node.id {
                return Err(TopologyError::NodeIdMismatch {
                    key: *key,
                    id: node.id,
                });
            }
        }

        for group in self.host_groups() {
            group.check_ports()?;
        }

        Ok(())
    }

    /// Fail when the caller needs at least one node.
    pub fn require_nodes(&self) -> Result<(), TopologyError> {
        if self.nodes.is_empty() {
            return Err(TopologyError::EmptyTopology);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Group nodes by host.
    ///
    /// Hosts appear in the order their first node appears in id order; nodes
    /// within a group are in id order. Recomputed on every call.
    pub fn host_groups(&self) -> Vec<HostGroup<'_>> {
        let mut groups: Vec<HostGroup<'_>> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for node in self.nodes.values() {
            match index.get(node.host.as_str()) {
                Some(&i) => groups[i].nodes.push(node),
                None => {
                    index.insert(node.host.as_str(), groups.len());
                    groups.push(HostGroup {
                        host: node.host.as_str(),
                        nodes: vec![node],
                    });
                }
            }
        }

        groups
    }

    /// Distinct hosts in first-seen order.
    pub fn hosts(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.nodes
            .values()
            .map(|node| node.host.as_str())
            .filter(|host| seen.insert(*host))
            .collect()
    }

    /// Nodes exposing the storage capability, in id order.
    pub fn fs_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|node| node.is_fs())
    }
}
