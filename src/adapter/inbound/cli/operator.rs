//! Inbound operator accessor for CLI handlers.

use std::path::Path;
use std::sync::OnceLock;

use tracing::debug;

use super::paths;
use crate::error::{ConfigError, Error, Result};
use crate::port::inbound::operator::port::OperatorPort;

static OPERATOR: OnceLock<Box<dyn OperatorPort>> = OnceLock::new();

/// Installs the operator implementation used by CLI handlers.
pub fn install(operator: Box<dyn OperatorPort>) -> std::result::Result<(), Box<dyn OperatorPort>> {
    OPERATOR.set(operator)
}

/// Returns the configured operator capability surface for CLI handlers.
///
/// # Errors
///
/// Returns [`Error::OperatorMissing`] if `install` was never called.
pub fn operator() -> Result<&'static dyn OperatorPort> {
    OPERATOR
        .get()
        .map(AsRef::as_ref)
        .ok_or(Error::OperatorMissing)
}

/// Read the config file the CLI should use.
///
/// `Ok(None)` means no file was given or found. An explicit path that does
/// not exist is an error.
pub fn read_config_toml(explicit: Option<&Path>) -> Result<Option<String>> {
    let Some(path) = paths::discover_config(explicit) else {
        debug!("No config file found, using defaults and environment");
        return Ok(None);
    };
    debug!(path = %path.display(), "Reading config");
    let content = std::fs::read_to_string(&path).map_err(ConfigError::ReadFile)?;
    Ok(Some(content))
}
