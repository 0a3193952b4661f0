//! Authenticated REST client for the Marzban panel HTTP API.
//!
//! Wraps the Marzban admin API (node inventory, traffic usage, system
//! statistics, core status, user list) using [`reqwest`]. Admin
//! authentication is token-based: a bearer token is obtained from
//! `POST /api/admin/token` and attached to every subsequent request.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::models::{CoreStats, Node, NodesUsageResponse, SystemStats, UsersResponse};

/// HTTP client for a single Marzban panel instance.
pub struct MarzbanClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    /// Cached admin bearer token. `None` until the first successful
    /// authentication; refreshed when the panel answers 401.
    token: RwLock<Option<String>>,
}

/// Response returned by the Marzban `/api/admin/token` endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Errors from the Marzban REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The panel returned a non-2xx status code.
    #[error("Marzban API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The token endpoint rejected the configured admin credentials.
    #[error("Marzban authentication failed ({status}): {body}")]
    Auth {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl MarzbanClient {
    /// Create a new client for a Marzban panel.
    ///
    /// * `base_url` - Panel base URL, e.g. `https://panel.example.com`.
    ///   A trailing slash is tolerated.
    /// * `timeout` - Per-request timeout applied to every call.
    ///
    /// No network traffic happens here; the token is acquired lazily on
    /// the first request.
    pub fn new(base_url: &str, username: String, password: String, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build reqwest HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
            token: RwLock::new(None),
        }
    }

    /// Fetch the node inventory (`GET /api/nodes`).
    pub async fn fetch_nodes(&self) -> Result<Vec<Node>, ClientError> {
        self.get_json("/nodes").await
    }

    /// Fetch per-node traffic usage (`GET /api/nodes/usage`).
    pub async fn fetch_nodes_usage(&self) -> Result<NodesUsageResponse, ClientError> {
        self.get_json("/nodes/usage").await
    }

    /// Fetch system-wide statistics (`GET /api/system`).
    pub async fn fetch_system(&self) -> Result<SystemStats, ClientError> {
        self.get_json("/system").await
    }

    /// Fetch xray core status (`GET /api/core`).
    pub async fn fetch_core(&self) -> Result<CoreStats, ClientError> {
        self.get_json("/core").await
    }

    /// Fetch the full user list (`GET /api/users`).
    pub async fn fetch_users(&self) -> Result<UsersResponse, ClientError> {
        self.get_json("/users").await
    }

    /// Exchange the configured admin credentials for a bearer token and
    /// cache it for subsequent requests.
    pub async fn authenticate(&self) -> Result<String, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/admin/token", self.base_url))
            .form(&[
                ("username", self.username.as_str()),
                ("password", self.password.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        let token_response: TokenResponse = response.json().await?;

        *self.token.write().await = Some(token_response.access_token.clone());
        tracing::debug!("Acquired Marzban admin token");

        Ok(token_response.access_token)
    }

    // ---- private helpers ----

    /// Return the cached token, authenticating first if none is cached.
    async fn token(&self) -> Result<String, ClientError> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }
        self.authenticate().await
    }

    /// GET an API path and deserialize the JSON response.
    ///
    /// A 401 answer means the cached token expired (Marzban admin tokens
    /// have a server-side lifetime), so the client re-authenticates once
    /// and retries the request before giving up.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let token = self.token().await?;
        let response = self.send_get(path, &token).await?;

        let response = if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!(path, "Token rejected, re-authenticating");
            let token = self.authenticate().await?;
            self.send_get(path, &token).await?
        } else {
            response
        };

        Self::parse_response(response).await
    }

    /// Issue a single authenticated GET request.
    async fn send_get(&self, path: &str, token: &str) -> Result<reqwest::Response, ClientError> {
        Ok(self
            .http
            .get(format!("{}/api{}", self.base_url, path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ClientError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
