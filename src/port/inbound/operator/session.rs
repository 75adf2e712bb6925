//! Dashboard session construction.

use std::sync::Arc;

use crate::error::Result;
use crate::port::inbound::dashboard::DashboardPort;

/// Where a dashboard session fetches from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionSource {
    /// Through the backend proxy (default; no API keys needed locally).
    #[default]
    Backend,
    /// Straight to the upstream APIs using locally configured keys.
    Direct,
}

#[derive(Debug, Clone, Default)]
pub struct SessionRequest {
    pub config_toml: Option<String>,
    pub backend_url: Option<String>,
    pub source: SessionSource,
    /// Use an in-memory preference store instead of the file.
    pub ephemeral_preferences: bool,
}

pub trait SessionOperator: Send + Sync {
    /// Wire a dashboard for one CLI invocation.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a client cannot
    /// be built.
    fn open_dashboard(&self, request: &SessionRequest) -> Result<Arc<dyn DashboardPort>>;
}
