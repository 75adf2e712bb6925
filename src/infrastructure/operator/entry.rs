//! The operator installed into the CLI by the binary.

use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Stateless bridge from CLI requests to infrastructure.
///
/// Every call parses the configuration it is handed, so one instance serves
/// the whole process.
#[derive(Debug, Clone, Copy, Default)]
pub struct Operator;

impl Operator {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Missing content means defaults plus environment.
    pub(super) fn load_config(config_toml: Option<&str>) -> Result<Config> {
        Config::parse_toml(config_toml.unwrap_or_default())
    }
}
