//! Proxy server control for operator-facing adapters.

use async_trait::async_trait;

use crate::error::Result;

/// Overrides from CLI flags, applied on top of the configuration.
#[derive(Debug, Clone, Default)]
pub struct ServeRequest {
    /// Raw TOML configuration content, if a file was found.
    pub config_toml: Option<String>,

    pub host: Option<String>,

    pub port: Option<u16>,

    /// Override for log level (e.g., "debug", "info", "warn").
    pub log_level: Option<String>,

    /// Whether to output logs as JSON.
    pub json_logs: bool,
}

/// What the server will run with, for the startup banner.
#[derive(Debug, Clone)]
pub struct ServeStartupSnapshot {
    pub bind_addr: String,
    pub nasa_demo_key: bool,
    pub giphy_enabled: bool,
    pub cors_origins: Vec<String>,
}

#[async_trait]
pub trait ServeOperator: Send + Sync {
    /// Resolve the configuration without binding anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    fn prepare_serve(&self, request: &ServeRequest) -> Result<ServeStartupSnapshot>;

    /// Run the proxy until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind or the server fails.
    async fn execute_serve(&self, request: ServeRequest) -> Result<()>;
}
