//! Configuration operator implementation.

use crate::adapter::inbound::http::state::{GIPHY_BREAKER, NASA_BREAKER, RICK_AND_MORTY_BREAKER};
use crate::error::Result;
use crate::port::inbound::operator::configuration::{
    ConfigBreaker, ConfigCachePolicy, ConfigValidationReport, ConfigView, ConfigurationOperator,
};

use super::entry::Operator;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl ConfigurationOperator for Operator {
    fn show_config(&self, config_toml: Option<&str>) -> Result<ConfigView> {
        let config = Self::load_config(config_toml)?;

        let breakers = [
            (NASA_BREAKER, config.circuit_breakers.nasa),
            (RICK_AND_MORTY_BREAKER, config.circuit_breakers.rickandmorty),
            (GIPHY_BREAKER, config.circuit_breakers.giphy),
        ]
        .into_iter()
        .map(|(name, breaker)| ConfigBreaker {
            name: name.to_string(),
            failure_threshold: breaker.failure_threshold,
            reset_timeout_secs: breaker.reset_timeout_secs,
        })
        .collect();

        let cache = config
            .cache
            .policies()
            .into_iter()
            .map(|(name, policy)| ConfigCachePolicy {
                name: name.trim_start_matches("cache.").to_string(),
                stale_secs: policy.stale_secs,
                gc_secs: policy.gc_secs,
            })
            .collect();

        Ok(ConfigView {
            bind_addr: config.server.bind_addr(),
            cors_origins: config.server.cors_origins.clone(),
            nasa_base_url: config.nasa.base_url.clone(),
            nasa_demo_key: config.nasa.uses_demo_key(),
            rickandmorty_base_url: config.rickandmorty.base_url.clone(),
            giphy_base_url: config.giphy.base_url.clone(),
            giphy_key_loaded: config.giphy.api_key.is_some(),
            backend_url: config.client.backend_url.clone(),
            preferences_path: config.preferences_path().display().to_string(),
            timeout_ms: config.http.timeout_ms,
            retry_max_attempts: config.http.retry_max_attempts,
            breakers,
            cache,
            gc_interval_secs: config.cache.gc_interval_secs,
            log_level: config.logging.level.clone(),
            log_format: config.logging.format.clone(),
        })
    }

    fn validate_config(&self, config_toml: Option<&str>) -> Result<ConfigValidationReport> {
        let config = Self::load_config(config_toml)?;
        let mut warnings = Vec::new();

        if config.nasa.uses_demo_key() {
            warnings.push(
                "NASA_API_KEY not set, DEMO_KEY allows only a few requests per hour".to_string(),
            );
        }

        if config.giphy.api_key.is_none() {
            warnings.push("GIPHY_API_KEY not set (GIF routes will answer 503)".to_string());
        }

        if config.server.cors_origins.iter().any(|o| o == "*") {
            warnings.push("CORS allows any origin".to_string());
        }

        if config.server.cors_origins.is_empty() {
            warnings.push("No CORS origins configured, browsers cannot call the proxy".to_string());
        }

        let level = config.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            warnings.push(format!(
                "Log level '{}' is not a plain level; it will be used as a filter directive",
                config.logging.level
            ));
        }

        Ok(ConfigValidationReport { warnings })
    }
}
