//! Composition root: turns a [`Config`] into proxy state and dashboards.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::adapter::inbound::http::state::{
    AppState, ServiceInfo, Upstreams, GIPHY_BREAKER, NASA_BREAKER, RICK_AND_MORTY_BREAKER,
};
use crate::adapter::outbound::backend::BackendClient;
use crate::adapter::outbound::catalog::StaticCatalog;
use crate::adapter::outbound::giphy::GiphyClient;
use crate::adapter::outbound::http::HttpFetcher;
use crate::adapter::outbound::nasa::NasaClient;
use crate::adapter::outbound::preferences::{JsonFileStore, MemoryPreferenceStore};
use crate::adapter::outbound::rickandmorty::RickAndMortyClient;
use crate::application::circuit::CircuitBreakerRegistry;
use crate::application::dashboard::{Dashboard, DashboardSources};
use crate::application::query::client::QueryClient;
use crate::application::query::policy::{QueryPolicies, QueryPolicy};
use crate::error::Result;
use crate::infrastructure::config::cache::{CacheConfig, CachePolicyConfig};
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::preferences::PreferenceStore;
use crate::port::outbound::upstream::GifSource;

/// `development` for debug builds, `production` otherwise.
#[must_use]
pub fn environment() -> &'static str {
    if cfg!(debug_assertions) {
        "development"
    } else {
        "production"
    }
}

/// Upstream clients talking to the real services.
///
/// # Errors
///
/// Returns an error if a configured base URL cannot be parsed.
pub fn build_upstreams(config: &Config) -> Result<Upstreams> {
    let http = HttpFetcher::from_config(&config.http);

    let apods = NasaClient::new(http.clone(), &config.nasa.base_url, &config.nasa.api_key)?;
    let characters = RickAndMortyClient::new(http.clone(), &config.rickandmorty.base_url)?;
    let gifs: Option<Arc<dyn GifSource>> = match config.giphy.api_key.as_deref() {
        Some(key) => Some(Arc::new(GiphyClient::new(http, &config.giphy.base_url, key)?)),
        None => {
            warn!("GIPHY_API_KEY not set, GIPHY routes will answer 503");
            None
        }
    };

    if config.nasa.uses_demo_key() {
        warn!("Using NASA DEMO_KEY, requests are heavily rate limited");
    }

    Ok(Upstreams {
        apods: Arc::new(apods),
        characters: Arc::new(characters),
        gifs,
    })
}

/// One breaker per upstream, with thresholds from configuration.
#[must_use]
pub fn build_breakers(config: &Config) -> Arc<CircuitBreakerRegistry> {
    let registry = CircuitBreakerRegistry::new();
    for (name, settings) in [
        (NASA_BREAKER, config.circuit_breakers.nasa),
        (RICK_AND_MORTY_BREAKER, config.circuit_breakers.rickandmorty),
        (GIPHY_BREAKER, config.circuit_breakers.giphy),
    ] {
        registry.register(name, settings.failure_threshold, settings.reset_timeout());
        debug!(
            breaker = name,
            failure_threshold = settings.failure_threshold,
            reset_timeout_secs = settings.reset_timeout_secs,
            "Circuit breaker registered"
        );
    }
    Arc::new(registry)
}

/// Everything the proxy router needs.
///
/// # Errors
///
/// Returns an error if an upstream client cannot be built.
pub fn build_app_state(config: &Config) -> Result<AppState> {
    let upstreams = build_upstreams(config)?;
    let breakers = build_breakers(config);
    Ok(AppState::new(upstreams, breakers, ServiceInfo::new(environment())))
}

fn policy(config: CachePolicyConfig) -> QueryPolicy {
    QueryPolicy::from_secs(config.stale_secs, config.gc_secs)
}

#[must_use]
pub fn build_policies(cache: &CacheConfig) -> QueryPolicies {
    QueryPolicies {
        default: policy(cache.default),
        apod: policy(cache.apod),
        characters: policy(cache.characters),
        gifs: policy(cache.gifs),
    }
}

/// Sources that go through the backend proxy. The proxy holds the API keys,
/// so GIPHY is always offered and the proxy decides.
///
/// # Errors
///
/// Returns an error if `backend_url` is not a valid URL.
pub fn backend_sources(config: &Config, backend_url: &str) -> Result<DashboardSources> {
    let http = HttpFetcher::from_config(&config.http);
    let backend = Arc::new(BackendClient::new(http, backend_url)?);
    info!(backend = %backend_url, "Dashboard reading through proxy");
    Ok(DashboardSources {
        apods: backend.clone(),
        characters: backend.clone(),
        gifs: Some(backend.clone() as Arc<dyn GifSource>),
        catalog: backend,
    })
}

/// Sources that call the upstream services from this process.
///
/// # Errors
///
/// Returns an error if an upstream client cannot be built.
pub fn direct_sources(config: &Config) -> Result<DashboardSources> {
    let upstreams = build_upstreams(config)?;
    info!("Dashboard calling upstream APIs directly");
    Ok(DashboardSources {
        apods: upstreams.apods,
        characters: upstreams.characters,
        gifs: upstreams.gifs,
        catalog: Arc::new(StaticCatalog),
    })
}

#[must_use]
pub fn preference_store(config: &Config, ephemeral: bool) -> Arc<dyn PreferenceStore> {
    if ephemeral {
        return Arc::new(MemoryPreferenceStore::default());
    }
    let path = config.preferences_path();
    debug!(path = %path.display(), "Preferences file");
    Arc::new(JsonFileStore::new(path))
}

/// Wire a dashboard over `sources`. Inside a tokio runtime the cache also
/// gets a periodic garbage-collection sweep.
#[must_use]
pub fn build_dashboard(
    config: &Config,
    sources: DashboardSources,
    preferences: Arc<dyn PreferenceStore>,
) -> Dashboard {
    let client = QueryClient::new();
    if tokio::runtime::Handle::try_current().is_ok() {
        drop(client.spawn_gc(Duration::from_secs(config.cache.gc_interval_secs)));
    }
    Dashboard::new(client, build_policies(&config.cache), sources, preferences)
}
