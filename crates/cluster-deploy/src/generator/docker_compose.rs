//! Docker Compose configuration generator.
//!
//! Produces one compose file per physical host. Each logical node on the host
//! becomes a `node<id>` service exposing its base port over UDP (bound to the
//! host address) and `port + 1` over TCP.

use super::{DocumentGenerator, GeneratedDocument};
use crate::config::DeployConfig;
use crate::error::DeployError;
use cluster_topology::{HostGroup, NodeId, Topology};
use serde::ser::Serializer;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Compose file format version.
pub const COMPOSE_VERSION: &str = "3";

/// Descriptor file name prefix and extension.
pub const DESCRIPTOR_PREFIX: &str = "compose_";
pub const DESCRIPTOR_EXTENSION: &str = ".yml";

/// Environment variable carrying the node id into the container.
pub const NODE_ID_ENV: &str = "SYS_NODEID";

/// One containerized logical node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceEntry {
    #[serde(skip)]
    pub name: String,
    #[serde(skip)]
    pub node_id: NodeId,
    #[serde(skip)]
    pub udp_port: u16,
    #[serde(skip)]
    pub tcp_port: u16,
    pub image: String,
    pub ports: Vec<String>,
    pub deploy: ServiceDeploy,
    pub volumes: Vec<String>,
    pub environment: ServiceEnvironment,
    /// Needed by the node process to shape host network traffic
    pub privileged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDeploy {
    pub resources: ServiceResources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceResources {
    pub limits: MemoryLimits,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryLimits {
    pub memory: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceEnvironment {
    #[serde(rename = "SYS_NODEID")]
    pub node_id: NodeId,
}

/// Whether `filename` has the shape of a generated descriptor.
pub fn is_descriptor_filename(filename: &str) -> bool {
    filename.starts_with(DESCRIPTOR_PREFIX) && filename.ends_with(DESCRIPTOR_EXTENSION)
}

/// Service name for a node.
pub fn service_name(node_id: NodeId) -> String {
    format!("node{node_id}")
}

/// Compose file for one physical host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentDescriptor {
    pub host: String,
    /// Services in node id order
    pub services: Vec<ServiceEntry>,
}

#[derive(Serialize)]
struct ComposeDocument<'a> {
    version: &'static str,
    services: ServiceMap<'a>,
}

/// Serializes services as a map keyed by service name, keeping node id order.
struct ServiceMap<'a>(&'a [ServiceEntry]);

impl Serialize for ServiceMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|s| (s.name.as_str(), s)))
    }
}

impl DeploymentDescriptor {
    /// Output file name, `compose_<host>.yml`.
    pub fn filename(&self) -> String {
        format!(
            "{DESCRIPTOR_PREFIX}{}{DESCRIPTOR_EXTENSION}",
            self.host.replace(':', "_")
        )
    }

    /// Render the descriptor as a compose YAML document.
    pub fn to_yaml(&self) -> Result<String, DeployError> {
        let document = ComposeDocument {
            version: COMPOSE_VERSION,
            services: ServiceMap(&self.services),
        };
        let yaml = serde_yaml::to_string(&document)?;

        let header = format!(
            "# Generated by cluster-gen\n# Host: {}\n# Services: {}\n\n",
            self.host,
            self.services.len()
        );

        Ok(header + &yaml)
    }
}

fn host_for_port_binding(host: &str) -> String {
    if host.contains(':') {
        format!("[{host}]")
    } else {
        host.to_string()
    }
}

fn compile_group(
    group: &HostGroup<'_>,
    config: &DeployConfig,
) -> Result<DeploymentDescriptor, DeployError> {
    group.check_ports()?;

    let mut names = HashSet::new();
    let mut services = Vec::with_capacity(group.nodes.len());

    for node in &group.nodes {
        let name = service_name(node.id);
        if !names.insert(name.clone()) {
            return Err(DeployError::DuplicateService {
                host: group.host.to_string(),
                service: name,
            });
        }

        // check_ports guarantees the secondary port exists
        let tcp_port = node
            .secondary_port()
            .ok_or(cluster_topology::TopologyError::PortOverflow {
                node: node.id,
                port: node.port,
            })?;

        services.push(ServiceEntry {
            name,
            node_id: node.id,
            udp_port: node.port,
            tcp_port,
            image: config.image(),
            ports: vec![
                format!(
                    "{}:{}:{}/udp",
                    host_for_port_binding(group.host),
                    node.port,
                    node.port
                ),
                format!("{tcp_port}:{tcp_port}"),
            ],
            deploy: ServiceDeploy {
                resources: ServiceResources {
                    limits: MemoryLimits {
                        memory: config.compose_memory_limit(),
                    },
                },
            },
            volumes: vec![config.files_volume()],
            environment: ServiceEnvironment { node_id: node.id },
            privileged: true,
        });
    }

    Ok(DeploymentDescriptor {
        host: group.host.to_string(),
        services,
    })
}

/// Group nodes by host and build one descriptor per host.
///
/// Fails on the first conflicting host without returning any descriptor.
/// Two hosts whose descriptor file names coincide are also a conflict.
pub fn compile_descriptors(
    topology: &Topology,
    config: &DeployConfig,
) -> Result<Vec<DeploymentDescriptor>, DeployError> {
    config.validate()?;

    let descriptors = topology
        .host_groups()
        .iter()
        .map(|group| compile_group(group, config))
        .collect::<Result<Vec<_>, _>>()?;

    let mut filenames: HashMap<String, &str> = HashMap::new();
    for descriptor in &descriptors {
        if let Some(first) = filenames.insert(descriptor.filename(), &descriptor.host) {
            return Err(DeployError::FilenameCollision {
                filename: descriptor.filename(),
                first: first.to_string(),
                second: descriptor.host.clone(),
            });
        }
        debug!(
            "Host {}: {} service(s)",
            descriptor.host,
            descriptor.services.len()
        );
    }

    Ok(descriptors)
}

/// Generator for per-host Docker Compose files.
pub struct DockerComposeGenerator {
    pub config: DeployConfig,
}

impl DockerComposeGenerator {
    pub fn new(config: DeployConfig) -> Self {
        Self { config }
    }
}

impl DocumentGenerator for DockerComposeGenerator {
    fn generate(&self, topology: &Topology) -> Result<Vec<GeneratedDocument>, DeployError> {
        compile_descriptors(topology, &self.config)?
            .iter()
            .map(|descriptor| {
                Ok(GeneratedDocument {
                    filename: descriptor.filename(),
                    content: descriptor.to_yaml()?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluster_topology::{Capability, Node};
    use serde_yaml::Value;

    fn two_node_topology() -> Topology {
        Topology::new(
            vec![
                Node::new(1, "10.0.0.1", 7000).with_capability(Capability::Fs),
                Node::new(2, "10.0.0.1", 7002),
            ],
            42,
            64,
        )
        .unwrap()
    }

    fn mixed_topology() -> Topology {
        Topology::new(
            vec![
                Node::new(1, "10.0.0.1", 7000),
                Node::new(2, "10.0.0.2", 7000),
                Node::new(3, "10.0.0.1", 7010),
                Node::new(4, "10.0.0.3", 7000),
                Node::new(5, "10.0.0.2", 7002),
            ],
            7,
            64,
        )
        .unwrap()
    }

    #[test]
    fn test_shared_host_yields_one_descriptor() {
        let descriptors =
            compile_descriptors(&two_node_topology(), &DeployConfig::new("simfs")).unwrap();

        assert_eq!(descriptors.len(), 1);
        let descriptor = &descriptors[0];
        assert_eq!(descriptor.host, "10.0.0.1");
        assert_eq!(descriptor.services.len(), 2);

        let ports: Vec<(u16, u16)> = descriptor
            .services
            .iter()
            .map(|s| (s.udp_port, s.tcp_port))
            .collect();
        assert_eq!(ports, vec![(7000, 7001), (7002, 7003)]);
        assert_eq!(descriptor.services[0].name, "node1");
        assert_eq!(descriptor.services[1].name, "node2");
    }

    #[test]
    fn test_descriptor_per_distinct_host_covers_all_nodes() {
        let topology = mixed_topology();
        let descriptors = compile_descriptors(&topology, &DeployConfig::new("simfs")).unwrap();

        assert_eq!(descriptors.len(), topology.hosts().len());

        let mut ids: Vec<NodeId> = descriptors
            .iter()
            .flat_map(|d| d.services.iter().map(|s| s.node_id))
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        for descriptor in &descriptors {
            for service in &descriptor.services {
                assert_eq!(topology.nodes[&service.node_id].host, descriptor.host);
            }
        }
    }

    #[test]
    fn test_port_collision_emits_nothing() {
        let mut topology = two_node_topology();
        topology.nodes.get_mut(&2).unwrap().port = 7000;

        let result = DockerComposeGenerator::new(DeployConfig::new("simfs")).generate(&topology);
        assert!(matches!(result, Err(DeployError::Conflict(_))));
    }

    #[test]
    fn test_secondary_port_collision_is_conflict() {
        let mut topology = two_node_topology();
        topology.nodes.get_mut(&2).unwrap().port = 6999;

        let result = compile_descriptors(&topology, &DeployConfig::new("simfs"));
        assert!(matches!(result, Err(DeployError::Conflict(_))));
    }

    #[test]
    fn test_duplicate_service_name_is_rejected() {
        let mut topology = two_node_topology();
        // Stored under key 2 but claiming id 1
        let node = topology.nodes.get_mut(&2).unwrap();
        node.id = 1;

        let result = compile_descriptors(&topology, &DeployConfig::new("simfs"));
        assert!(matches!(
            result,
            Err(DeployError::DuplicateService { ref service, .. }) if service == "node1"
        ));
    }

    #[test]
    fn test_hosts_sharing_a_filename_are_rejected() {
        let topology = Topology::new(
            vec![Node::new(1, "::1", 7000), Node::new(2, "__1", 7000)],
            1,
            64,
        )
        .unwrap();

        let result = DockerComposeGenerator::new(DeployConfig::new("simfs")).generate(&topology);
        assert!(matches!(
            result,
            Err(DeployError::FilenameCollision { ref filename, ref first, ref second })
                if filename == "compose___1.yml" && first == "::1" && second == "__1"
        ));
    }

    #[test]
    fn test_descriptor_filename_shape() {
        assert!(is_descriptor_filename("compose_10.0.0.1.yml"));
        assert!(!is_descriptor_filename("gen_ansible.ini"));
        assert!(!is_descriptor_filename("compose_10.0.0.1.yml.bak"));
    }

    #[test]
    fn test_invalid_project_name() {
        let result = compile_descriptors(&two_node_topology(), &DeployConfig::new("My App"));
        assert!(matches!(result, Err(DeployError::InvalidProjectName(_))));
    }

    #[test]
    fn test_compose_yaml_content() {
        let docs = DockerComposeGenerator::new(DeployConfig::new("simfs"))
            .generate(&two_node_topology())
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].filename, "compose_10.0.0.1.yml");

        let content = &docs[0].content;
        assert!(content.starts_with("# Generated by cluster-gen\n# Host: 10.0.0.1\n"));

        let root: Value = serde_yaml::from_str(content).unwrap();
        assert_eq!(root["version"], Value::String("3".to_string()));

        let node1 = &root["services"]["node1"];
        assert_eq!(node1["image"], Value::String("simfs:v1".to_string()));
        assert_eq!(
            node1["ports"][0],
            Value::String("10.0.0.1:7000:7000/udp".to_string())
        );
        assert_eq!(node1["ports"][1], Value::String("7001:7001".to_string()));
        assert_eq!(
            node1["deploy"]["resources"]["limits"]["memory"],
            Value::String("6G".to_string())
        );
        assert_eq!(
            node1["volumes"][0],
            Value::String("/root/simfs_deploy/files:/etc/simfs/files".to_string())
        );
        assert_eq!(node1["environment"][NODE_ID_ENV], Value::from(1u32));
        assert_eq!(node1["privileged"], Value::Bool(true));

        assert_eq!(
            root["services"]["node2"]["ports"][1],
            Value::String("7003:7003".to_string())
        );
    }

    #[test]
    fn test_services_follow_node_id_order() {
        let topology = Topology::new(
            vec![
                Node::new(10, "10.0.0.1", 7000),
                Node::new(2, "10.0.0.1", 7004),
            ],
            1,
            64,
        )
        .unwrap();
        let docs = DockerComposeGenerator::new(DeployConfig::new("simfs"))
            .generate(&topology)
            .unwrap();

        let content = &docs[0].content;
        let node2 = content.find("node2:").unwrap();
        let node10 = content.find("node10:").unwrap();
        assert!(node2 < node10);
    }

    #[test]
    fn test_generation_is_idempotent() {
        let generator = DockerComposeGenerator::new(DeployConfig::new("simfs"));
        let topology = mixed_topology();

        let first = generator.generate(&topology).unwrap();
        let second = generator.generate(&topology).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_topology_has_no_descriptors() {
        let topology = Topology::new(Vec::new(), 1, 64).unwrap();
        let docs = DockerComposeGenerator::new(DeployConfig::new("simfs"))
            .generate(&topology)
            .unwrap();
        assert!(docs.is_empty());
    }
}
