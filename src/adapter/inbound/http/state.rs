//! Shared handler state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::application::circuit::{CircuitBreaker, CircuitBreakerRegistry};
use crate::port::outbound::upstream::{ApodSource, CharacterSource, GifSource};

pub const NASA_BREAKER: &str = "nasa-apod";
pub const RICK_AND_MORTY_BREAKER: &str = "rick-and-morty";
pub const GIPHY_BREAKER: &str = "giphy";

/// Used only when a route runs before its breaker was registered.
const FALLBACK_FAILURE_THRESHOLD: u32 = 5;
const FALLBACK_RESET_TIMEOUT: Duration = Duration::from_secs(30);

/// The upstream clients the proxy forwards to.
#[derive(Clone)]
pub struct Upstreams {
    pub apods: Arc<dyn ApodSource>,
    pub characters: Arc<dyn CharacterSource>,
    /// `None` without a GIPHY key; the GIPHY routes then answer 503.
    pub gifs: Option<Arc<dyn GifSource>>,
}

#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub version: String,
    /// `development` or `production`.
    pub environment: String,
    pub started_at: Instant,
}

impl ServiceInfo {
    #[must_use]
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: environment.into(),
            started_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn uptime_seconds(&self) -> f64 {
        (self.started_at.elapsed().as_secs_f64() * 100.0).round() / 100.0
    }
}

#[derive(Clone)]
pub struct AppState {
    pub upstreams: Upstreams,
    pub breakers: Arc<CircuitBreakerRegistry>,
    pub info: Arc<ServiceInfo>,
}

impl AppState {
    #[must_use]
    pub fn new(
        upstreams: Upstreams,
        breakers: Arc<CircuitBreakerRegistry>,
        info: ServiceInfo,
    ) -> Self {
        Self {
            upstreams,
            breakers,
            info: Arc::new(info),
        }
    }

    /// The breaker guarding `name`. Registration is idempotent, so breakers
    /// set up from configuration keep their thresholds.
    #[must_use]
    pub fn breaker(&self, name: &str) -> Arc<CircuitBreaker> {
        self.breakers
            .register(name, FALLBACK_FAILURE_THRESHOLD, FALLBACK_RESET_TIMEOUT)
    }
}
