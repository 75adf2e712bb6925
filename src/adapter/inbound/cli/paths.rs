//! Where the CLI looks for its configuration.
//!
//! An explicit `--config` wins. Otherwise `./config.toml`, then
//! `<config dir>/grabapis/config.toml`. No file at all is fine: defaults and
//! the environment apply.

use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "config.toml";

/// Per-user configuration directory (`~/.config/grabapis` on Linux).
pub fn home_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("grabapis")
}

/// Per-user config file.
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}

/// First existing candidate, if any.
#[must_use]
pub fn discover_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    [PathBuf::from(LOCAL_CONFIG), default_config()]
        .into_iter()
        .find(|candidate| candidate.is_file())
}
