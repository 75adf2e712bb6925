//! Configuration projections for operator-facing adapters.

use crate::error::Result;

/// Freshness windows of one cache policy, in seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigCachePolicy {
    pub name: String,
    pub stale_secs: u64,
    pub gc_secs: u64,
}

/// One upstream circuit breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBreaker {
    pub name: String,
    pub failure_threshold: u32,
    pub reset_timeout_secs: u64,
}

/// Full configuration projection for operator-facing output.
///
/// Secrets are reduced to whether they are set.
#[derive(Debug, Clone)]
pub struct ConfigView {
    pub bind_addr: String,
    pub cors_origins: Vec<String>,
    pub nasa_base_url: String,
    pub nasa_demo_key: bool,
    pub rickandmorty_base_url: String,
    pub giphy_base_url: String,
    pub giphy_key_loaded: bool,
    pub backend_url: String,
    pub preferences_path: String,
    pub timeout_ms: u64,
    pub retry_max_attempts: u32,
    pub breakers: Vec<ConfigBreaker>,
    pub cache: Vec<ConfigCachePolicy>,
    pub gc_interval_secs: u64,
    pub log_level: String,
    pub log_format: String,
}

/// Validation output for `check config`.
#[derive(Debug, Clone, Default)]
pub struct ConfigValidationReport {
    pub warnings: Vec<String>,
}

/// Configuration use-cases for operator-facing adapters.
///
/// `config_toml` is the raw file content; `None` means no file, so defaults
/// plus environment.
pub trait ConfigurationOperator: Send + Sync {
    /// Build a projection for display.
    fn show_config(&self, config_toml: Option<&str>) -> Result<ConfigView>;

    /// Validate config and return non-fatal warnings.
    fn validate_config(&self, config_toml: Option<&str>) -> Result<ConfigValidationReport>;
}
