use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use marzban_client::ClientError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`ClientError`] for upstream failures and adds an encoding
/// variant. Implements [`IntoResponse`] to produce consistent JSON
/// error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A failure talking to the Marzban panel.
    #[error(transparent)]
    Upstream(#[from] ClientError),

    /// Rendering the metric registry to text failed.
    #[error("Failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Upstream(err) => match err {
                ClientError::Auth { status, .. } => {
                    tracing::error!(upstream_status = status, "Marzban authentication failed");
                    (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_AUTH_FAILED",
                        "Marzban panel rejected the exporter credentials".to_string(),
                    )
                }
                ClientError::Api { status, .. } => {
                    tracing::error!(upstream_status = status, "Marzban API request failed");
                    (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_ERROR",
                        format!("Marzban panel returned HTTP {status}"),
                    )
                }
                ClientError::Request(err) => {
                    tracing::error!(error = %err, "Marzban panel unreachable");
                    (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_ERROR",
                        "Marzban panel is unreachable".to_string(),
                    )
                }
            },
            AppError::Encode(err) => {
                tracing::error!(error = %err, "Metrics encoding failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ENCODE_ERROR",
                    "Failed to encode metrics".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
