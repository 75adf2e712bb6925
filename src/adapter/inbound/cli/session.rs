//! Dashboard session wiring shared by the read commands.

use std::path::PathBuf;
use std::sync::Arc;

use super::command::Cli;
use super::operator;
use crate::error::Result;
use crate::port::inbound::dashboard::DashboardPort;
use crate::port::inbound::operator::session::{SessionRequest, SessionSource};

/// Global flags that decide how a dashboard session is built.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub config: Option<PathBuf>,
    pub direct: bool,
    pub backend_url: Option<String>,
}

impl SessionOptions {
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            config: cli.config.clone(),
            direct: cli.direct,
            backend_url: cli.backend_url.clone(),
        }
    }

    /// Build the request for the operator without opening anything.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit config file cannot be read.
    pub fn request(&self) -> Result<SessionRequest> {
        Ok(SessionRequest {
            config_toml: operator::read_config_toml(self.config.as_deref())?,
            backend_url: self.backend_url.clone(),
            source: if self.direct {
                SessionSource::Direct
            } else {
                SessionSource::Backend
            },
            ephemeral_preferences: false,
        })
    }

    /// Open a dashboard for this invocation.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the operator is
    /// not installed.
    pub fn open(&self) -> Result<Arc<dyn DashboardPort>> {
        let request = self.request()?;
        operator::operator()?.open_dashboard(&request)
    }
}
