//! Handler for the `check` command group.

use std::path::Path;

use crate::adapter::inbound::cli::{operator, output, paths};
use crate::error::Result;

/// Validate the configuration without starting anything.
pub fn execute_config(path: Option<&Path>) -> Result<()> {
    let config_toml = operator::read_config_toml(path)?;
    let report = operator::operator()?.validate_config(config_toml.as_deref())?;

    output::section("Configuration Check");
    match paths::discover_config(path) {
        Some(found) if config_toml.is_some() => output::field("Config", found.display()),
        _ => output::field("Config", output::muted("(none, using defaults)")),
    }
    output::success("Configuration is valid");

    if report.warnings.is_empty() {
        output::success("No warnings");
    } else {
        for warning in &report.warnings {
            output::warning(warning);
        }
    }

    output::success("Configuration check complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_config_fails_before_operator() {
        let err = execute_config(Some(Path::new("/nope/grabapis.toml"))).unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(_)));
    }
}
