/// Exporter configuration loaded from environment variables.
///
/// The Marzban connection settings are required; everything else has
/// defaults suitable for running inside the published container
/// (listen on `0.0.0.0:8000`).
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Marzban panel base URL, e.g. `https://panel.example.com`.
    pub marzban_url: String,
    /// Marzban admin username.
    pub marzban_username: String,
    /// Marzban admin password.
    pub marzban_password: String,
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Timeout for each upstream API request in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

/// A required environment variable was missing or a value failed to parse.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{0} must be a valid {1}")]
    Invalid(&'static str, &'static str),
}

impl ExporterConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                | Required | Default   |
    /// |------------------------|----------|-----------|
    /// | `MARZBAN_URL`          | yes      | --        |
    /// | `MARZBAN_USERNAME`     | yes      | --        |
    /// | `MARZBAN_PASSWORD`     | yes      | --        |
    /// | `HOST`                 | no       | `0.0.0.0` |
    /// | `PORT`                 | no       | `8000`    |
    /// | `REQUEST_TIMEOUT_SECS` | no       | `30`      |
    pub fn from_env() -> Result<Self, ConfigError> {
        let marzban_url =
            std::env::var("MARZBAN_URL").map_err(|_| ConfigError::Missing("MARZBAN_URL"))?;
        let marzban_username = std::env::var("MARZBAN_USERNAME")
            .map_err(|_| ConfigError::Missing("MARZBAN_USERNAME"))?;
        let marzban_password = std::env::var("MARZBAN_PASSWORD")
            .map_err(|_| ConfigError::Missing("MARZBAN_PASSWORD"))?;

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .map_err(|_| ConfigError::Invalid("PORT", "u16"))?;

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS", "u64"))?;

        Ok(Self {
            marzban_url,
            marzban_username,
            marzban_password,
            host,
            port,
            request_timeout_secs,
        })
    }
}
