//! Proxy server operator implementation.

use async_trait::async_trait;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::adapter::inbound::http::router;
use crate::error::{Error, Result};
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;
use crate::port::inbound::operator::serve::{ServeOperator, ServeRequest, ServeStartupSnapshot};

use super::entry::Operator;

impl Operator {
    fn load_serve_config(request: &ServeRequest) -> Result<Config> {
        let mut config = Self::load_config(request.config_toml.as_deref())?;
        Self::apply_serve_overrides(&mut config, request);
        Ok(config)
    }

    fn apply_serve_overrides(config: &mut Config, request: &ServeRequest) {
        if let Some(ref host) = request.host {
            config.server.host = host.clone();
        }

        if let Some(port) = request.port {
            config.server.port = port;
        }

        if let Some(ref log_level) = request.log_level {
            config.logging.level = log_level.clone();
        }

        if request.json_logs {
            config.logging.format = "json".to_string();
        }
    }
}

#[async_trait]
impl ServeOperator for Operator {
    fn prepare_serve(&self, request: &ServeRequest) -> Result<ServeStartupSnapshot> {
        let config = Self::load_serve_config(request)?;
        Ok(ServeStartupSnapshot {
            bind_addr: config.server.bind_addr(),
            nasa_demo_key: config.nasa.uses_demo_key(),
            giphy_enabled: config.giphy.api_key.is_some(),
            cors_origins: config.server.cors_origins,
        })
    }

    async fn execute_serve(&self, request: ServeRequest) -> Result<()> {
        let config = Self::load_serve_config(&request)?;
        config.init_logging();

        let state = bootstrap::build_app_state(&config)?;
        let app = router::build_router(state, &config.server.cors_origins);

        let bind_addr = config.server.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await.map_err(|err| {
            error!(addr = %bind_addr, error = %err, "Failed to bind");
            Error::Server(format!("cannot bind {bind_addr}: {err}"))
        })?;

        info!(
            addr = %bind_addr,
            environment = bootstrap::environment(),
            version = env!("CARGO_PKG_VERSION"),
            "grabapis proxy starting"
        );

        router::serve(listener, app, router::shutdown_signal())
            .await
            .map_err(|err| Error::Server(err.to_string()))?;

        info!("grabapis proxy stopped");
        Ok(())
    }
}
