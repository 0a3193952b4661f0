//! Shared helpers for exporter integration tests.
//!
//! Builds the real application router (same middleware stack as
//! `main.rs`) wired against an [`httpmock`] stand-in for the Marzban
//! panel, and provides small request/response conveniences around
//! `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderName, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use httpmock::prelude::*;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use marzban_client::MarzbanClient;
use marzban_exporter::config::ExporterConfig;
use marzban_exporter::routes;
use marzban_exporter::state::AppState;

/// Build a test `ExporterConfig` pointing at the given mock panel URL.
pub fn test_config(marzban_url: &str) -> ExporterConfig {
    ExporterConfig {
        marzban_url: marzban_url.to_string(),
        marzban_username: "admin".to_string(),
        marzban_password: "secret".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 5,
    }
}

/// Build the full application router with all middleware layers.
///
/// This mirrors the router construction in `main.rs` so integration
/// tests exercise the same middleware stack (request ID, timeout,
/// tracing, panic recovery) that production uses.
pub fn build_test_app(marzban_url: &str) -> Router {
    let config = test_config(marzban_url);

    let client = MarzbanClient::new(
        &config.marzban_url,
        config.marzban_username.clone(),
        config.marzban_password.clone(),
        Duration::from_secs(config.request_timeout_secs),
    );

    let state = AppState {
        client: Arc::new(client),
        config: Arc::new(config),
    };

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::router())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .with_state(state)
}

/// Install mocks for the token endpoint and all five panel endpoints,
/// answering with a small but fully-populated panel.
pub fn mock_healthy_panel(server: &MockServer) {
    mock_token(server);
    mock_nodes(server);
    mock_nodes_usage(server);
    mock_system(server);
    mock_core(server);
    mock_users(server);
}

pub fn mock_token(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(POST).path("/api/admin/token");
        then.status(200).json_body(serde_json::json!({
            "access_token": "test-token",
            "token_type": "bearer"
        }));
    })
}

pub fn mock_nodes(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/api/nodes");
        then.status(200).json_body(serde_json::json!([
            {
                "name": "node-1",
                "address": "10.0.0.5",
                "port": 62050,
                "api_port": 62051,
                "xray_version": "1.8.4",
                "status": "connected",
                "usage_coefficient": 1.0
            }
        ]));
    })
}

pub fn mock_nodes_usage(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/api/nodes/usage");
        then.status(200).json_body(serde_json::json!({
            "usages": [
                { "node_name": "node-1", "uplink": 1234, "downlink": 5678 }
            ]
        }));
    })
}

pub fn mock_system(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/api/system");
        then.status(200).json_body(serde_json::json!({
            "version": "0.4.9",
            "mem_total": 8000000000u64,
            "mem_used": 2000000000u64,
            "cpu_usage": 12.5,
            "total_user": 2,
            "users_active": 1,
            "incoming_bandwidth": 111,
            "outgoing_bandwidth": 222
        }));
    })
}

pub fn mock_core(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/api/core");
        then.status(200).json_body(serde_json::json!({ "started": true }));
    })
}

pub fn mock_users(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/api/users");
        then.status(200).json_body(serde_json::json!({
            "users": [
                { "username": "alice", "lifetime_used_traffic": 42 },
                { "username": "bob", "lifetime_used_traffic": 7 }
            ],
            "total": 2
        }));
    })
}

/// Issue a GET request against the in-process router.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request should build"),
    )
    .await
    .expect("request should not fail at the transport level")
}

/// Collect a response body as a UTF-8 string.
pub async fn body_text(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

/// Collect and parse a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let text = body_text(response).await;
    serde_json::from_str(&text).expect("body should be valid JSON")
}
