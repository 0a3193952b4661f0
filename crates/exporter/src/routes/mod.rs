pub mod health;
pub mod metrics;

use axum::Router;

use crate::state::AppState;

/// Build the full route tree.
///
/// ```text
/// /health      service liveness + version
/// /metrics     Prometheus exposition page
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(metrics::router())
}
