//! `marzban-exporter` -- Prometheus exporter for the Marzban panel.
//!
//! Scrapes the Marzban admin REST API on every `/metrics` request and
//! publishes node, system, core, and user statistics in the Prometheus
//! text exposition format.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default   | Description                       |
//! |------------------------|----------|-----------|-----------------------------------|
//! | `MARZBAN_URL`          | yes      | --        | Panel base URL                    |
//! | `MARZBAN_USERNAME`     | yes      | --        | Admin username                    |
//! | `MARZBAN_PASSWORD`     | yes      | --        | Admin password                    |
//! | `HOST`                 | no       | `0.0.0.0` | Bind address                      |
//! | `PORT`                 | no       | `8000`    | Bind port                         |
//! | `REQUEST_TIMEOUT_SECS` | no       | `30`      | Per-request upstream timeout      |

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marzban_client::MarzbanClient;
use marzban_exporter::config::ExporterConfig;
use marzban_exporter::{routes, state::AppState};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marzban_exporter=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = match ExporterConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(
        host = %config.host,
        port = config.port,
        marzban_url = %config.marzban_url,
        "Loaded exporter configuration"
    );

    // --- Marzban client ---
    let client = MarzbanClient::new(
        &config.marzban_url,
        config.marzban_username.clone(),
        config.marzban_password.clone(),
        Duration::from_secs(config.request_timeout_secs),
    );

    // Fail fast on bad credentials instead of serving 502s forever.
    match client.authenticate().await {
        Ok(_) => tracing::info!("Authenticated against Marzban panel"),
        Err(e) => {
            tracing::warn!(error = %e, "Initial authentication failed, will retry on first scrape");
        }
    }

    // --- App state ---
    let state = AppState {
        client: Arc::new(client),
        config: Arc::new(config.clone()),
    };

    // --- Request ID header name ---
    let request_id_header = HeaderName::from_static("x-request-id");

    // --- Router ---
    let app = Router::new()
        .merge(routes::router())
        // -- Middleware stack (applied bottom-up) --
        // Panic recovery: catch panics and return 500.
        .layer(CatchPanicLayer::new())
        // Request timeout: a hung panel must not hang the scraper.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs + 5),
        ))
        // Propagate request ID to response.
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        // Structured request/response tracing.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Set request ID on incoming requests.
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        // Shared state.
        .with_state(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting exporter");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the exporter
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
