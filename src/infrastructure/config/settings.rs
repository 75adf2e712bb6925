//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from an optional TOML file, then environment
//! variables (including a `.env` file loaded by the binary) override it.
//!
//! # Example
//!
//! ```no_run
//! use grabapis::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use super::cache::CacheConfig;
use super::logging::LoggingConfig;
use super::server::{parse_origins, ServerConfig};
use super::upstream::{
    CircuitBreakersConfig, ClientConfig, GiphyConfig, HttpConfig, NasaConfig, RickAndMortyConfig,
};
use crate::application::circuit::MAX_RESET_TIMEOUT;
use crate::application::query::policy::MAX_WINDOW_SECS;
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Proxy listener and CORS.
    #[serde(default)]
    pub server: ServerConfig,

    /// Shared HTTP client behaviour for every upstream.
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub nasa: NasaConfig,

    #[serde(default)]
    pub rickandmorty: RickAndMortyConfig,

    #[serde(default)]
    pub giphy: GiphyConfig,

    #[serde(default)]
    pub circuit_breakers: CircuitBreakersConfig,

    /// Query cache policies.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Dashboard client settings.
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content, apply process environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed, an environment override
    /// cannot be parsed, or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        Self::parse_toml_with_env(content, |name| std::env::var(name).ok())
    }

    /// Like [`Self::parse_toml`] but reading overrides through `lookup`.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml_with_env(
        content: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed or
    /// validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load from `path` if it exists, otherwise start from defaults. The
    /// environment applies either way.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Self::parse_toml("")
        }
    }

    /// Apply environment overrides. Empty values are ignored.
    #[allow(clippy::result_large_err)]
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = get("NASA_API_KEY") {
            self.nasa.api_key = key;
        }
        if let Some(url) = get("NASA_BASE_URL") {
            self.nasa.base_url = url;
        }
        if let Some(url) = get("RICK_AND_MORTY_BASE_URL") {
            self.rickandmorty.base_url = url;
        }
        if let Some(key) = get("GIPHY_API_KEY") {
            self.giphy.api_key = Some(key);
        }
        if let Some(url) = get("GIPHY_BASE_URL") {
            self.giphy.base_url = url;
        }
        if let Some(url) = get("GRABAPIS_BACKEND_URL") {
            self.client.backend_url = url;
        }
        if let Some(path) = get("GRABAPIS_PREFERENCES") {
            self.client.preferences_path = Some(path);
        }
        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                field: "PORT",
                reason: format!("'{port}' is not a valid port"),
            })?;
        }
        if let Some(origins) = get("BACKEND_CORS_ORIGINS") {
            self.server.cors_origins = parse_origins(&origins);
        }
        if let Some(timeout) = get("API_TIMEOUT") {
            let secs: u64 = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                field: "API_TIMEOUT",
                reason: format!("'{timeout}' is not a whole number of seconds"),
            })?;
            self.http.timeout_ms = secs.saturating_mul(1000);
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }
        Ok(())
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if self.nasa.api_key.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "nasa.api_key",
            }
            .into());
        }
        validate_url("nasa.base_url", &self.nasa.base_url)?;
        validate_url("rickandmorty.base_url", &self.rickandmorty.base_url)?;
        validate_url("giphy.base_url", &self.giphy.base_url)?;
        validate_url("client.backend_url", &self.client.backend_url)?;

        if self.http.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.http.retry_max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.retry_max_attempts",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }

        for (field, breaker) in [
            ("circuit_breakers.nasa", self.circuit_breakers.nasa),
            ("circuit_breakers.rickandmorty", self.circuit_breakers.rickandmorty),
            ("circuit_breakers.giphy", self.circuit_breakers.giphy),
        ] {
            if breaker.failure_threshold == 0 || breaker.reset_timeout_secs == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "failure_threshold and reset_timeout_secs must be greater than 0"
                        .to_string(),
                }
                .into());
            }
            if breaker.reset_timeout_secs > MAX_RESET_TIMEOUT.as_secs() {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!(
                        "reset_timeout_secs must be at most {}",
                        MAX_RESET_TIMEOUT.as_secs()
                    ),
                }
                .into());
            }
        }

        for (field, policy) in self.cache.policies() {
            if policy.gc_secs > MAX_WINDOW_SECS {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("stale_secs and gc_secs must be at most {MAX_WINDOW_SECS}"),
                }
                .into());
            }
            if policy.gc_secs < policy.stale_secs {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "gc_secs must be >= stale_secs".to_string(),
                }
                .into());
            }
        }
        if self.cache.gc_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.gc_interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("'{}' is not one of pretty, json", self.logging.format),
            }
            .into());
        }
        Ok(())
    }

    /// Preferences file: configured path, or `<data dir>/grabapis/preferences.json`.
    #[must_use]
    pub fn preferences_path(&self) -> PathBuf {
        match &self.client.preferences_path {
            Some(path) => PathBuf::from(path),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("grabapis")
                .join("preferences.json"),
        }
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

#[allow(clippy::result_large_err)]
fn validate_url(field: &'static str, value: &str) -> Result<()> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(url) => Err(ConfigError::InvalidValue {
            field,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }
        .into()),
        Err(err) => Err(ConfigError::InvalidValue {
            field,
            reason: err.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::Error;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::parse_toml_with_env("", env(&[])).unwrap();
        assert_eq!(config.nasa.api_key, "DEMO_KEY");
        assert!(config.nasa.uses_demo_key());
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.http.timeout_ms, 30_000);
        assert_eq!(config.giphy.api_key, None);
        assert_eq!(config.cache.apod.stale_secs, 3600);
        assert_eq!(config.circuit_breakers.nasa.reset_timeout_secs, 60);
    }

    #[test]
    fn env_overrides_file() {
        let toml = r#"
            [nasa]
            api_key = "from-file"

            [server]
            port = 9000
        "#;
        let config = Config::parse_toml_with_env(
            toml,
            env(&[
                ("NASA_API_KEY", "from-env"),
                ("API_TIMEOUT", "5"),
                ("BACKEND_CORS_ORIGINS", "http://a.test, http://b.test"),
                ("GIPHY_API_KEY", "  "),
            ]),
        )
        .unwrap();

        assert_eq!(config.nasa.api_key, "from-env");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.http.timeout_ms, 5_000);
        assert_eq!(config.server.cors_origins.len(), 2);
        assert_eq!(config.giphy.api_key, None);
    }

    #[test]
    fn bad_port_env() {
        let err = Config::parse_toml_with_env("", env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { field: "PORT", .. })
        ));
    }

    #[test]
    fn rejects_bad_urls() {
        let toml = r#"
            [rickandmorty]
            base_url = "ftp://example.com"
        "#;
        let err = Config::parse_toml_with_env(toml, env(&[])).unwrap_err();
        assert!(err.to_string().contains("rickandmorty.base_url"));
    }

    #[test]
    fn rejects_gc_shorter_than_stale() {
        let toml = r#"
            [cache.gifs]
            stale_secs = 600
            gc_secs = 60
        "#;
        let err = Config::parse_toml_with_env(toml, env(&[])).unwrap_err();
        assert!(err.to_string().contains("cache.gifs"));
    }

    #[test]
    fn preferences_path_override() {
        let config =
            Config::parse_toml_with_env("", env(&[("GRABAPIS_PREFERENCES", "/tmp/p.json")]))
                .unwrap();
        assert_eq!(config.preferences_path(), PathBuf::from("/tmp/p.json"));
    }
}
