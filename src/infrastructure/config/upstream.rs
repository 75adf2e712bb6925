//! Upstream API, HTTP client and circuit breaker configuration.

use std::time::Duration;

use serde::Deserialize;

/// Shared HTTP client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in milliseconds (`API_TIMEOUT` is in seconds).
    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_http_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Total attempts for transient network failures.
    #[serde(default = "default_http_retry_max_attempts")]
    pub retry_max_attempts: u32,
    /// First retry delay in milliseconds; doubles per attempt.
    #[serde(default = "default_http_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

const fn default_http_timeout_ms() -> u64 {
    30_000
}

const fn default_http_connect_timeout_ms() -> u64 {
    5_000
}

const fn default_http_retry_max_attempts() -> u32 {
    4
}

const fn default_http_retry_backoff_ms() -> u64 {
    1_000
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_http_timeout_ms(),
            connect_timeout_ms: default_http_connect_timeout_ms(),
            retry_max_attempts: default_http_retry_max_attempts(),
            retry_backoff_ms: default_http_retry_backoff_ms(),
        }
    }
}

/// NASA APOD settings.
#[derive(Debug, Clone, Deserialize)]
pub struct NasaConfig {
    /// `NASA_API_KEY`. The shared demo key is heavily rate limited.
    #[serde(default = "default_nasa_api_key")]
    pub api_key: String,
    #[serde(default = "default_nasa_base_url")]
    pub base_url: String,
}

fn default_nasa_api_key() -> String {
    "DEMO_KEY".to_string()
}

fn default_nasa_base_url() -> String {
    "https://api.nasa.gov/".to_string()
}

impl Default for NasaConfig {
    fn default() -> Self {
        Self {
            api_key: default_nasa_api_key(),
            base_url: default_nasa_base_url(),
        }
    }
}

impl NasaConfig {
    #[must_use]
    pub fn uses_demo_key(&self) -> bool {
        self.api_key == "DEMO_KEY"
    }
}

/// Rick and Morty settings. The API needs no credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct RickAndMortyConfig {
    #[serde(default = "default_rickandmorty_base_url")]
    pub base_url: String,
}

fn default_rickandmorty_base_url() -> String {
    "https://rickandmortyapi.com/api/".to_string()
}

impl Default for RickAndMortyConfig {
    fn default() -> Self {
        Self {
            base_url: default_rickandmorty_base_url(),
        }
    }
}

/// GIPHY settings. Without a key the GIPHY routes are unavailable.
#[derive(Debug, Clone, Deserialize)]
pub struct GiphyConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_giphy_base_url")]
    pub base_url: String,
}

fn default_giphy_base_url() -> String {
    "https://api.giphy.com/v1/".to_string()
}

impl Default for GiphyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_giphy_base_url(),
        }
    }
}

/// One breaker's thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit.
    pub failure_threshold: u32,
    /// Seconds the circuit stays open before a probe is admitted.
    pub reset_timeout_secs: u64,
}

impl CircuitBreakerConfig {
    #[must_use]
    pub const fn new(failure_threshold: u32, reset_timeout_secs: u64) -> Self {
        Self {
            failure_threshold,
            reset_timeout_secs,
        }
    }

    #[must_use]
    pub const fn reset_timeout(&self) -> Duration {
        Duration::from_secs(self.reset_timeout_secs)
    }
}

/// `[circuit_breakers]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakersConfig {
    #[serde(default = "default_nasa_breaker")]
    pub nasa: CircuitBreakerConfig,
    #[serde(default = "default_rickandmorty_breaker")]
    pub rickandmorty: CircuitBreakerConfig,
    #[serde(default = "default_giphy_breaker")]
    pub giphy: CircuitBreakerConfig,
}

const fn default_nasa_breaker() -> CircuitBreakerConfig {
    CircuitBreakerConfig::new(5, 60)
}

const fn default_rickandmorty_breaker() -> CircuitBreakerConfig {
    CircuitBreakerConfig::new(5, 30)
}

const fn default_giphy_breaker() -> CircuitBreakerConfig {
    CircuitBreakerConfig::new(5, 30)
}

impl Default for CircuitBreakersConfig {
    fn default() -> Self {
        Self {
            nasa: default_nasa_breaker(),
            rickandmorty: default_rickandmorty_breaker(),
            giphy: default_giphy_breaker(),
        }
    }
}

/// Dashboard-side settings: where the proxy lives and where preferences go.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// `GRABAPIS_BACKEND_URL`.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// `GRABAPIS_PREFERENCES`; `None` means the platform data directory.
    #[serde(default)]
    pub preferences_path: Option<String>,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            preferences_path: None,
        }
    }
}
