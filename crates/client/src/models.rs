//! Typed payloads for the Marzban API endpoints the exporter scrapes.
//!
//! Every field the panel may omit (or send as `null`) carries a serde
//! default, so a partial payload deserializes instead of failing the
//! whole scrape. Label-bearing strings default to `"unknown"`.

use serde::Deserialize;

fn unknown() -> String {
    "unknown".to_string()
}

/// A node entry from `GET /api/nodes`.
#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    #[serde(default = "unknown")]
    pub name: String,
    #[serde(default = "unknown")]
    pub address: String,
    #[serde(default)]
    pub port: u32,
    #[serde(default)]
    pub api_port: u32,
    /// `null` until the node has connected at least once.
    #[serde(default)]
    pub xray_version: Option<String>,
    /// Connection status, e.g. `connected`, `connecting`, `error`.
    #[serde(default = "unknown")]
    pub status: String,
    /// Multiplier applied to the node's reported traffic.
    #[serde(default)]
    pub usage_coefficient: f64,
}

/// Response body of `GET /api/nodes/usage`.
#[derive(Debug, Clone, Deserialize)]
pub struct NodesUsageResponse {
    #[serde(default)]
    pub usages: Vec<NodeUsage>,
}

/// Aggregated traffic counters for one node.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeUsage {
    #[serde(default = "unknown")]
    pub node_name: String,
    /// Bytes sent from the node to clients.
    #[serde(default)]
    pub uplink: u64,
    /// Bytes received by the node from clients.
    #[serde(default)]
    pub downlink: u64,
}

/// Response body of `GET /api/system`.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemStats {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub mem_total: u64,
    #[serde(default)]
    pub mem_used: u64,
    #[serde(default)]
    pub cpu_usage: f64,
    #[serde(default)]
    pub total_user: u64,
    #[serde(default)]
    pub users_active: u64,
    #[serde(default)]
    pub incoming_bandwidth: u64,
    #[serde(default)]
    pub outgoing_bandwidth: u64,
}

/// Response body of `GET /api/core`.
#[derive(Debug, Clone, Deserialize)]
pub struct CoreStats {
    /// Whether the xray core process is running.
    #[serde(default)]
    pub started: bool,
}

/// Response body of `GET /api/users`.
#[derive(Debug, Clone, Deserialize)]
pub struct UsersResponse {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub total: u64,
}

/// A single user entry from `GET /api/users`.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(default = "unknown")]
    pub username: String,
    /// Total traffic ever used by this user, in bytes.
    #[serde(default)]
    pub lifetime_used_traffic: u64,
}
