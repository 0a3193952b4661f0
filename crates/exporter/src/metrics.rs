//! Translation of Marzban API payloads into Prometheus metric families.
//!
//! Metrics are computed per scrape: [`scrape`] pulls a consistent
//! snapshot of the panel over five concurrent API calls, and [`render`]
//! turns that snapshot into a freshly-built registry encoded in the
//! Prometheus text exposition format. Nothing is cached between
//! scrapes, so every exposition reflects the panel as of the request.

use marzban_client::models::{CoreStats, Node, NodesUsageResponse, SystemStats, UsersResponse};
use marzban_client::{ClientError, MarzbanClient};
use prometheus::{Gauge, GaugeVec, Opts, Registry, TextEncoder};

/// A consistent point-in-time view of the Marzban panel.
#[derive(Debug, Clone)]
pub struct PanelSnapshot {
    pub nodes: Vec<Node>,
    pub usage: NodesUsageResponse,
    pub system: SystemStats,
    pub core: CoreStats,
    pub users: UsersResponse,
}

/// Fetch all panel endpoints concurrently.
///
/// Fails the whole scrape if any endpoint fails -- a half-populated
/// exposition page would silently zero counters on the Prometheus side.
pub async fn scrape(client: &MarzbanClient) -> Result<PanelSnapshot, ClientError> {
    let (nodes, usage, system, core, users) = tokio::try_join!(
        client.fetch_nodes(),
        client.fetch_nodes_usage(),
        client.fetch_system(),
        client.fetch_core(),
        client.fetch_users(),
    )?;

    Ok(PanelSnapshot {
        nodes,
        usage,
        system,
        core,
        users,
    })
}

/// Render a snapshot in the Prometheus text exposition format.
pub fn render(snapshot: &PanelSnapshot) -> Result<String, prometheus::Error> {
    let registry = build_registry(snapshot)?;
    let encoder = TextEncoder::new();
    encoder.encode_to_string(&registry.gather())
}

/// Build a registry populated with every metric family the exporter
/// publishes for the given snapshot.
fn build_registry(snapshot: &PanelSnapshot) -> Result<Registry, prometheus::Error> {
    let registry = Registry::new();

    collect_node_metrics(&registry, &snapshot.nodes)?;
    collect_node_usage_metrics(&registry, &snapshot.usage)?;
    collect_system_metrics(&registry, &snapshot.system)?;
    collect_core_metrics(&registry, &snapshot.core)?;
    collect_user_metrics(&registry, &snapshot.users)?;

    // Conventional liveness gauge: the page only exists if the scrape
    // succeeded, so this is always 1 when visible.
    gauge(
        &registry,
        "marzban_up",
        "Whether the last scrape of the Marzban panel succeeded",
        1.0,
    )?;

    Ok(registry)
}

/// Per-node configuration metrics from `/api/nodes`.
fn collect_node_metrics(registry: &Registry, nodes: &[Node]) -> Result<(), prometheus::Error> {
    let usage_coefficient = gauge_vec(
        registry,
        "node_usage_coefficient",
        "Node usage coefficient",
        &["node_name"],
    )?;
    let node_info = gauge_vec(
        registry,
        "node_info",
        "Node address, port, API port, xray version, and status",
        &[
            "node_name",
            "address",
            "port",
            "api_port",
            "xray_version",
            "status",
        ],
    )?;

    for node in nodes {
        usage_coefficient
            .with_label_values(&[&node.name])
            .set(node.usage_coefficient);

        // Info-style metric: the value is a constant 1, the payload
        // lives entirely in the labels.
        node_info
            .with_label_values(&[
                &node.name,
                &node.address,
                &node.port.to_string(),
                &node.api_port.to_string(),
                node.xray_version.as_deref().unwrap_or("unknown"),
                &node.status,
            ])
            .set(1.0);
    }

    Ok(())
}

/// Per-node traffic counters from `/api/nodes/usage`.
fn collect_node_usage_metrics(
    registry: &Registry,
    usage: &NodesUsageResponse,
) -> Result<(), prometheus::Error> {
    let uplink = gauge_vec(
        registry,
        "node_uplink_bytes",
        "Node uplink traffic in bytes",
        &["node_name"],
    )?;
    let downlink = gauge_vec(
        registry,
        "node_downlink_bytes",
        "Node downlink traffic in bytes",
        &["node_name"],
    )?;

    for entry in &usage.usages {
        uplink
            .with_label_values(&[&entry.node_name])
            .set(entry.uplink as f64);
        downlink
            .with_label_values(&[&entry.node_name])
            .set(entry.downlink as f64);
    }

    Ok(())
}

/// System-wide statistics from `/api/system`.
fn collect_system_metrics(
    registry: &Registry,
    system: &SystemStats,
) -> Result<(), prometheus::Error> {
    // Presence marker only; the panel reports the version as a string.
    gauge(registry, "system_version", "System version", 1.0)?;
    gauge(
        registry,
        "system_memory_total_bytes",
        "Total system memory in bytes",
        system.mem_total as f64,
    )?;
    gauge(
        registry,
        "system_memory_used_bytes",
        "Used system memory in bytes",
        system.mem_used as f64,
    )?;
    gauge(
        registry,
        "system_cpu_usage_percent",
        "System CPU usage percentage",
        system.cpu_usage,
    )?;
    gauge(
        registry,
        "system_total_users",
        "Total number of users in the system",
        system.total_user as f64,
    )?;
    gauge(
        registry,
        "system_active_users",
        "Number of active users in the system",
        system.users_active as f64,
    )?;
    gauge(
        registry,
        "system_incoming_bandwidth_bytes",
        "Total incoming bandwidth in bytes",
        system.incoming_bandwidth as f64,
    )?;
    gauge(
        registry,
        "system_outgoing_bandwidth_bytes",
        "Total outgoing bandwidth in bytes",
        system.outgoing_bandwidth as f64,
    )?;

    Ok(())
}

/// Xray core status from `/api/core`.
fn collect_core_metrics(registry: &Registry, core: &CoreStats) -> Result<(), prometheus::Error> {
    gauge(
        registry,
        "core_started",
        "Core started status",
        if core.started { 1.0 } else { 0.0 },
    )
}

/// Per-user traffic from `/api/users`.
fn collect_user_metrics(
    registry: &Registry,
    users: &UsersResponse,
) -> Result<(), prometheus::Error> {
    gauge(
        registry,
        "total_users",
        "Total number of users",
        users.users.len() as f64,
    )?;

    let traffic = gauge_vec(
        registry,
        "user_lifetime_used_traffic_bytes",
        "Lifetime used traffic per user in bytes",
        &["username"],
    )?;

    for user in &users.users {
        traffic
            .with_label_values(&[&user.username])
            .set(user.lifetime_used_traffic as f64);
    }

    Ok(())
}

// ---- registration helpers ----

/// Register a plain gauge set to `value`.
fn gauge(
    registry: &Registry,
    name: &str,
    help: &str,
    value: f64,
) -> Result<(), prometheus::Error> {
    let gauge = Gauge::with_opts(Opts::new(name, help))?;
    gauge.set(value);
    registry.register(Box::new(gauge))
}

/// Register and return a labelled gauge family.
fn gauge_vec(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> Result<GaugeVec, prometheus::Error> {
    let vec = GaugeVec::new(Opts::new(name, help), labels)?;
    registry.register(Box::new(vec.clone()))?;
    Ok(vec)
}
