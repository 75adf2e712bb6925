//! Handler for the `config` command group.

use std::fs;
use std::path::Path;

use crate::adapter::inbound::cli::{operator, output, paths};
use crate::error::{ConfigError, Result};

/// Default config template with documentation.
const CONFIG_TEMPLATE: &str = include_str!("../../../../config.toml.example");

/// Execute `config init`.
pub fn execute_init(path: Option<&Path>, force: bool) -> Result<()> {
    let path = path.map_or_else(paths::default_config, Path::to_path_buf);
    if path.exists() && !force {
        return Err(ConfigError::InvalidValue {
            field: "config",
            reason: "file already exists (use --force to overwrite)".to_string(),
        }
        .into());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&path, CONFIG_TEMPLATE)?;
    output::section("Config Initialized");
    output::success("Created configuration file");
    output::field("Path", path.display());
    output::section("Next Steps");
    output::note(&format!("1. Edit {} with your settings", path.display()));
    output::note("2. Set NASA_API_KEY and GIPHY_API_KEY for the proxy");
    output::note(&format!("3. Run: grabapis -c {} check config", path.display()));
    output::note(&format!("4. Run: grabapis -c {} serve", path.display()));
    Ok(())
}

/// Execute `config show`.
pub fn execute_show(path: Option<&Path>) -> Result<()> {
    let config_toml = operator::read_config_toml(path)?;
    let config = operator::operator()?.show_config(config_toml.as_deref())?;

    output::section("Effective Configuration");
    output::field(
        "Source",
        if config_toml.is_some() {
            "file + environment"
        } else {
            "defaults + environment"
        },
    );

    output::section("Server");
    output::field("Bind", &config.bind_addr);
    output::field("CORS", config.cors_origins.join(", "));
    output::field("Timeout", format!("{}ms", config.timeout_ms));
    output::field("Retries", config.retry_max_attempts);

    output::section("Upstreams");
    output::field("NASA", &config.nasa_base_url);
    if config.nasa_demo_key {
        output::field("NASA key", output::muted("DEMO_KEY"));
    } else {
        output::field("NASA key", "set");
    }
    output::field("Rick&Morty", &config.rickandmorty_base_url);
    output::field("GIPHY", &config.giphy_base_url);
    output::field(
        "GIPHY key",
        if config.giphy_key_loaded { "set" } else { "not set" },
    );

    output::section("Circuit Breakers");
    for breaker in &config.breakers {
        output::field(
            &breaker.name,
            format!(
                "{} failures, {}s reset",
                breaker.failure_threshold, breaker.reset_timeout_secs
            ),
        );
    }

    output::section("Cache");
    for policy in &config.cache {
        output::field(
            &policy.name,
            format!("stale {}s, gc {}s", policy.stale_secs, policy.gc_secs),
        );
    }
    output::field("GC sweep", format!("{}s", config.gc_interval_secs));

    output::section("Client");
    output::field("Backend", &config.backend_url);
    output::field("Favorites", &config.preferences_path);

    output::section("Logging");
    output::field("Level", &config.log_level);
    output::field("Format", &config.log_format);
    Ok(())
}
