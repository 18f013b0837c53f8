//! Remote-execution inventory generator.
//!
//! Every distinct host contributes exactly one line:
//!
//! ```text
//! [web]
//! webserver10.0.0.1 ansible_host=10.0.0.1 ansible_user=root
//! ```

use super::{DocumentGenerator, GeneratedDocument};
use crate::config::InventoryConfig;
use crate::error::DeployError;
use cluster_topology::Topology;

/// Inventory output file name.
pub const INVENTORY_FILENAME: &str = "gen_ansible.ini";

/// One host in the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryEntry {
    /// Stable label derived from the host
    pub label: String,
    pub host: String,
    /// Administrative login
    pub user: String,
}

/// Ordered, deduplicated host inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    pub group: String,
    pub entries: Vec<InventoryEntry>,
}

impl Inventory {
    /// Render as an INI-style inventory document.
    pub fn render(&self) -> String {
        let mut out = format!("[{}]\n", self.group);
        for entry in &self.entries {
            out.push_str(&format!(
                "{} ansible_host={} ansible_user={}\n",
                entry.label, entry.host, entry.user
            ));
        }
        out
    }
}

/// Deduplicate hosts in first-seen order. An empty topology yields an empty
/// inventory.
pub fn compile_inventory(topology: &Topology, config: &InventoryConfig) -> Inventory {
    let entries = topology
        .hosts()
        .into_iter()
        .map(|host| InventoryEntry {
            label: format!("{}{}", config.label_prefix, host),
            host: host.to_string(),
            user: config.user.clone(),
        })
        .collect();

    Inventory {
        group: config.group.clone(),
        entries,
    }
}

/// Generator for the host inventory document.
#[derive(Default)]
pub struct InventoryGenerator {
    pub config: InventoryConfig,
}

impl DocumentGenerator for InventoryGenerator {
    fn generate(&self, topology: &Topology) -> Result<Vec<GeneratedDocument>, DeployError> {
        let inventory = compile_inventory(topology, &self.config);
        Ok(vec![GeneratedDocument {
            filename: INVENTORY_FILENAME.to_string(),
            content: inventory.render(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluster_topology::Node;

    #[test]
    fn test_shared_host_contributes_one_line() {
        let topology = Topology::new(
            vec![
                Node::new(1, "10.0.0.1", 7000),
                Node::new(2, "10.0.0.1", 7002),
            ],
            1,
            64,
        )
        .unwrap();

        let inventory = compile_inventory(&topology, &InventoryConfig::default());
        assert_eq!(inventory.entries.len(), 1);
        assert_eq!(
            inventory.render(),
            "[web]\nwebserver10.0.0.1 ansible_host=10.0.0.1 ansible_user=root\n"
        );
    }

    #[test]
    fn test_first_seen_order() {
        let topology = Topology::new(
            vec![
                Node::new(1, "10.0.0.9", 7000),
                Node::new(2, "10.0.0.3", 7000),
                Node::new(3, "10.0.0.9", 7002),
                Node::new(4, "10.0.0.5", 7000),
            ],
            1,
            64,
        )
        .unwrap();

        let hosts: Vec<String> = compile_inventory(&topology, &InventoryConfig::default())
            .entries
            .into_iter()
            .map(|e| e.host)
            .collect();
        assert_eq!(hosts, vec!["10.0.0.9", "10.0.0.3", "10.0.0.5"]);
    }

    #[test]
    fn test_empty_topology_is_not_an_error() {
        let topology = Topology::new(Vec::new(), 1, 64).unwrap();
        let docs = InventoryGenerator::default().generate(&topology).unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].filename, INVENTORY_FILENAME);
        assert_eq!(docs[0].content, "[web]\n");
    }
}
