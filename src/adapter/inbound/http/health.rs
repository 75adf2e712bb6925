//! Service info and health probes.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use super::state::AppState;
use crate::application::circuit::CircuitMetrics;

const SERVICE_NAME: &str = "grab-some-apis-api";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
    pub uptime_seconds: f64,
}

#[derive(Debug, Serialize)]
pub struct DependencyStatus {
    pub status: &'static str,
    pub circuit_state: &'static str,
    pub success_rate_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_in_seconds: Option<u64>,
}

impl From<&CircuitMetrics> for DependencyStatus {
    fn from(metrics: &CircuitMetrics) -> Self {
        let status = if metrics.is_open {
            "unhealthy"
        } else if metrics.is_unhealthy() {
            "degraded"
        } else {
            "healthy"
        };
        Self {
            status,
            circuit_state: metrics.state,
            success_rate_percent: metrics.success_rate_percent,
            retry_in_seconds: metrics.retry_in_seconds,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    #[serde(flatten)]
    pub health: HealthResponse,
    pub dependencies: BTreeMap<String, DependencyStatus>,
    pub overall_status: &'static str,
}

fn health(state: &AppState, status: &'static str) -> HealthResponse {
    HealthResponse {
        status,
        service: SERVICE_NAME,
        version: state.info.version.clone(),
        timestamp: Utc::now(),
        environment: state.info.environment.clone(),
        uptime_seconds: state.info.uptime_seconds(),
    }
}

/// `GET /`.
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Welcome to Grab Some APIs API",
        "version": state.info.version,
        "docs": "/api/apis",
        "status": "healthy",
    }))
}

/// `GET /health`: the minimal probe kept at the root for load balancers.
pub async fn basic(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": state.info.version,
        "environment": state.info.environment,
    }))
}

/// `GET /api/health`.
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health(&state, "healthy"))
}

/// `GET /api/health/live`.
pub async fn live(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health(&state, "alive"))
}

/// `GET /api/health/ready`: 503 while any upstream circuit is open.
pub async fn ready(State(state): State<AppState>) -> Response {
    let report = state.breakers.report();
    if report.open_circuit_names.is_empty() {
        return Json(health(&state, "ready")).into_response();
    }
    let detail = format!(
        "Service not ready - open circuits: {}",
        report.open_circuit_names.join(", ")
    );
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "detail": detail })),
    )
        .into_response()
}

/// `GET /api/health/detailed`: one dependency per upstream breaker.
pub async fn detailed(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    let dependencies: BTreeMap<String, DependencyStatus> = state
        .breakers
        .metrics()
        .iter()
        .map(|(name, metrics)| (name.clone(), DependencyStatus::from(metrics)))
        .collect();

    let overall = if dependencies.values().any(|d| d.status == "unhealthy") {
        "unhealthy"
    } else if dependencies.values().any(|d| d.status == "degraded") {
        "degraded"
    } else {
        "healthy"
    };

    Json(DetailedHealthResponse {
        health: health(&state, overall),
        dependencies,
        overall_status: overall,
    })
}
