// Types shared across the pipeline - wire structures from the node's RPC and
// the resolved/aggregated records built from them

use serde::Deserialize;
use std::fmt;
use std::net::IpAddr;

/// Name shown for an ASN whose lookup succeeded without an organization name
pub const UNKNOWN_AS_NAME: &str = "Unknown";

/// Autonomous System Number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct Asn(pub u32);

impl fmt::Display for Asn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AS{}", self.0)
    }
}

// =============================================================================
// RPC WIRE TYPES
// =============================================================================

/// JSON-RPC envelope returned by `/net_info`
#[derive(Debug, Deserialize)]
pub struct NetInfoResponse {
    #[allow(dead_code)]
    #[serde(default)]
    pub jsonrpc: String,
    pub result: Option<NetInfo>,
    pub error: Option<RpcErrorBody>,
}

/// JSON-RPC error member
#[derive(Debug, Deserialize)]
pub struct RpcErrorBody {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<String>,
}

/// Network info reported by the node
#[derive(Debug, Clone, Deserialize)]
pub struct NetInfo {
    #[serde(default)]
    pub listening: bool,
    #[serde(default)]
    pub listeners: Vec<String>,
    /// Peer count as reported on the wire (a decimal string)
    pub n_peers: String,
    #[serde(default)]
    pub peers: Vec<Peer>,
}

/// A connected peer. Connection monitors and channel stats are not decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct Peer {
    #[serde(default)]
    pub node_info: NodeInfo,
    #[serde(default)]
    pub is_outbound: bool,
    /// Left empty when missing; the peer is then skipped at resolution
    #[serde(default)]
    pub remote_ip: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub listen_addr: String,
    #[serde(default)]
    pub network: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub moniker: String,
}

impl NetInfo {
    /// Number of outbound connections in the peer list
    pub fn outbound_count(&self) -> usize {
        self.peers.iter().filter(|p| p.is_outbound).count()
    }
}

// =============================================================================
// PIPELINE RECORDS
// =============================================================================

/// Result of a single successful ASN lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsnRecord {
    pub asn: Asn,
    pub name: String,
}

impl AsnRecord {
    /// Build a record, substituting `Unknown` for a blank organization name
    pub fn new(asn: Asn, name: &str) -> Self {
        let name = name.trim();
        Self {
            asn,
            name: if name.is_empty() {
                UNKNOWN_AS_NAME.to_string()
            } else {
                name.to_string()
            },
        }
    }
}

/// A peer IP paired with its ASN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPeer {
    pub ip: IpAddr,
    pub asn: Asn,
    pub name: String,
}

/// Peer count for one ASN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsnSummary {
    pub asn: Asn,
    pub name: String,
    pub count: usize,
}
