use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::{routing::get, Router};

use crate::error::AppResult;
use crate::metrics;
use crate::state::AppState;

/// GET /metrics -- scrape the Marzban panel and render the exposition page.
///
/// Each request performs a fresh scrape; there is no cache. An upstream
/// failure fails the whole request with 502 so Prometheus records the
/// target as down instead of ingesting a partial page.
async fn serve_metrics(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let snapshot = metrics::scrape(&state.client).await?;
    let body = metrics::render(&snapshot)?;

    tracing::debug!(
        nodes = snapshot.nodes.len(),
        users = snapshot.users.users.len(),
        "Scrape complete"
    );

    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}

/// Mount the metrics route.
pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", get(serve_metrics))
}
