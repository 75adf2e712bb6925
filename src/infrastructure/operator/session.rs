//! Dashboard session operator implementation.

use std::sync::Arc;

use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::port::inbound::dashboard::DashboardPort;
use crate::port::inbound::operator::session::{SessionOperator, SessionRequest, SessionSource};

use super::entry::Operator;

impl SessionOperator for Operator {
    fn open_dashboard(&self, request: &SessionRequest) -> Result<Arc<dyn DashboardPort>> {
        let config = Self::load_config(request.config_toml.as_deref())?;

        let sources = match request.source {
            SessionSource::Backend => {
                let backend_url = request
                    .backend_url
                    .as_deref()
                    .unwrap_or(&config.client.backend_url);
                bootstrap::backend_sources(&config, backend_url)?
            }
            SessionSource::Direct => bootstrap::direct_sources(&config)?,
        };
        let preferences = bootstrap::preference_store(&config, request.ephemeral_preferences);

        Ok(Arc::new(bootstrap::build_dashboard(
            &config,
            sources,
            preferences,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_backend_url_is_rejected() {
        let request = SessionRequest {
            backend_url: Some("::not a url::".into()),
            ephemeral_preferences: true,
            ..SessionRequest::default()
        };
        assert!(Operator.open_dashboard(&request).is_err());
    }

    #[test]
    fn ephemeral_direct_session_starts_empty() {
        let request = SessionRequest {
            source: SessionSource::Direct,
            ephemeral_preferences: true,
            ..SessionRequest::default()
        };
        let dashboard = Operator.open_dashboard(&request).unwrap();
        assert_eq!(dashboard.preferences().unwrap().favorite_count(), 0);
        assert!(dashboard.toggle_favorite_character(3).unwrap());
        assert!(dashboard.preferences().unwrap().is_favorite_character(3));
    }
}
