//! Route table, middleware and the serve loop.

use std::future::Future;
use std::time::Duration;

use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, Request};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use super::state::AppState;
use super::{catalog, giphy, health, monitoring, nasa, rickandmorty};

/// Tags every request with a fresh `x-request-id` unless the caller sent one.
#[derive(Debug, Clone, Copy, Default)]
struct RequestUuid;

impl MakeRequestId for RequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// CORS for the configured dashboard origins. `*` allows any origin
/// without credentials.
#[must_use]
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    if origins.iter().any(|origin| origin == "*") {
        return base.allow_origin(AllowOrigin::any());
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(allowed).allow_credentials(true)
}

pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-");
        tracing::info_span!(
            "http.request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::basic))
        .route("/api/health", get(health::check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/detailed", get(health::detailed))
        .route(
            "/api/monitoring/circuit-breakers",
            get(monitoring::summary),
        )
        .route(
            "/api/monitoring/circuit-breakers/reset",
            post(monitoring::reset_all),
        )
        .route(
            "/api/monitoring/circuit-breakers/{name}",
            get(monitoring::details),
        )
        .route(
            "/api/monitoring/circuit-breakers/{name}/reset",
            post(monitoring::reset_one),
        )
        .route("/api/apis", get(catalog::list))
        .route("/api/apis/categories", get(catalog::categories))
        .route("/api/apis/{id}", get(catalog::detail))
        .route("/api/v1/nasa/apod", get(nasa::apod))
        .route(
            "/api/v1/rickandmorty/character",
            get(rickandmorty::characters),
        )
        .route(
            "/api/v1/rickandmorty/character/{ids}",
            get(rickandmorty::characters_by_ids),
        )
        .route("/api/v1/rickandmorty/location", get(rickandmorty::locations))
        .route("/api/v1/rickandmorty/episode", get(rickandmorty::episodes))
        .route("/api/v1/giphy/trending", get(giphy::trending))
        .route("/api/v1/giphy/search", get(giphy::search))
        .route("/api/v1/giphy/random", get(giphy::random))
        .route("/api/v1/giphy/gif/{id}", get(giphy::gif))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(trace)
        .layer(cors_layer(cors_origins))
        .layer(SetRequestIdLayer::x_request_id(RequestUuid))
        .with_state(state)
}

/// Serve `router` until `shutdown` resolves, then drain in-flight requests.
///
/// # Errors
///
/// Returns an error if accepting connections fails.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "Backend proxy listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Backend proxy stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(err) => {
                warn!(error = %err, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
