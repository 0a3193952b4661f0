use std::sync::Arc;

use marzban_client::MarzbanClient;

use crate::config::ExporterConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Authenticated Marzban API client.
    pub client: Arc<MarzbanClient>,
    /// Exporter configuration.
    pub config: Arc<ExporterConfig>,
}
