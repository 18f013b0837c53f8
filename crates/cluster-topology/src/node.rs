//! Logical node definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::net::SocketAddr;

/// Identifier of a logical node, unique within a topology.
pub type NodeId = u32;

/// Capability tags a node can expose.
///
/// The set is closed: unknown tags are rejected when the topology is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Storage/filesystem node; receives an access workload.
    Fs,
    /// Object-store backed source node.
    S3,
    /// Request router node.
    Router,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Fs => write!(f, "fs"),
            Capability::S3 => write!(f, "s3"),
            Capability::Router => write!(f, "router"),
        }
    }
}

impl std::str::FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fs" => Ok(Capability::Fs),
            "s3" => Ok(Capability::S3),
            "router" => Ok(Capability::Router),
            _ => Err(format!("Unknown capability: {s}")),
        }
    }
}

/// A logical cluster participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Unique node identifier
    pub id: NodeId,
    /// IP address or hostname of the physical host
    pub host: String,
    /// Base port; the node also claims `port + 1`
    pub port: u16,
    /// Capability tags
    pub capabilities: BTreeSet<Capability>,
}

impl Node {
    /// Create a node without capabilities.
    pub fn new(id: NodeId, host: impl Into<String>, port: u16) -> Self {
        Self {
            id,
            host: host.into(),
            port,
            capabilities: BTreeSet::new(),
        }
    }

    /// Add a capability tag.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn is_fs(&self) -> bool {
        self.has_capability(Capability::Fs)
    }

    /// Secondary (TCP) port, `port + 1`.
    ///
    /// Returns `None` when the base port is the last valid port.
    pub fn secondary_port(&self) -> Option<u16> {
        self.port.checked_add(1)
    }
}

/// Split a `host:port` address into its host and port.
///
/// Socket addresses are tried first so bracketed IPv6 literals work; anything
/// else is treated as `hostname:port`.
pub fn parse_addr(addr: &str) -> Result<(String, u16), String> {
    if let Ok(socket) = addr.parse::<SocketAddr>() {
        return Ok((socket.ip().to_string(), socket.port()));
    }

    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| "expected host:port".to_string())?;

    if host.is_empty() {
        return Err("host is empty".to_string());
    }
    if host.contains(':') || host.chars().any(char::is_whitespace) {
        return Err(format!("invalid host '{host}'"));
    }
    if !host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
    {
        return Err(format!("invalid host '{host}'"));
    }

    let port = port
        .parse::<u16>()
        .map_err(|e| format!("invalid port '{port}': {e}"))?;

    Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ipv4_addr() {
        let (host, port) = parse_addr("10.0.0.1:7000").unwrap();
        assert_eq!(host, "10.0.0.1");
        assert_eq!(port, 7000);
    }

    #[test]
    fn test_parse_hostname_addr() {
        let (host, port) = parse_addr("worker-3.lan:9000").unwrap();
        assert_eq!(host, "worker-3.lan");
        assert_eq!(port, 9000);
    }

    #[test]
    fn test_parse_ipv6_addr() {
        let (host, port) = parse_addr("[::1]:7000").unwrap();
        assert_eq!(host, "::1");
        assert_eq!(port, 7000);
    }

    #[test]
    fn test_parse_invalid_addrs() {
        assert!(parse_addr("10.0.0.1").is_err());
        assert!(parse_addr(":7000").is_err());
        assert!(parse_addr("10.0.0.1:notaport").is_err());
        assert!(parse_addr("10.0.0.1:70000").is_err());
        assert!(parse_addr("bad host:7000").is_err());
    }

    #[test]
    fn test_capability_from_str() {
        assert_eq!("fs".parse::<Capability>().unwrap(), Capability::Fs);
        assert_eq!("S3".parse::<Capability>().unwrap(), Capability::S3);
        assert_eq!("router".parse::<Capability>().unwrap(), Capability::Router);
        assert!("gpu".parse::<Capability>().is_err());
    }

    #[test]
    fn test_secondary_port() {
        assert_eq!(Node::new(1, "h", 7000).secondary_port(), Some(7001));
        assert_eq!(Node::new(1, "h", u16::MAX).secondary_port(), None);
    }
}
