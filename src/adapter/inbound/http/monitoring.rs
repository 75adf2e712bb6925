//! `/api/monitoring/circuit-breakers`.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use super::state::AppState;
use crate::application::circuit::{CircuitMetrics, RegistryReport};

#[derive(Debug, Serialize)]
pub struct CircuitDetails {
    pub circuit_name: String,
    pub metrics: CircuitMetrics,
    pub recommendations: BTreeMap<&'static str, String>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

fn unknown_circuit(state: &AppState, name: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "detail": format!("Circuit breaker '{name}' not found"),
            "available_circuits": state.breakers.names(),
        })),
    )
        .into_response()
}

/// `GET /api/monitoring/circuit-breakers`.
pub async fn summary(State(state): State<AppState>) -> Json<RegistryReport> {
    Json(state.breakers.report())
}

/// `GET /api/monitoring/circuit-breakers/{name}`.
pub async fn details(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.breakers.get(&name) {
        Some(breaker) => {
            let metrics = breaker.metrics();
            let recommendations = metrics.recommendations();
            Json(CircuitDetails {
                circuit_name: name,
                metrics,
                recommendations,
            })
            .into_response()
        }
        None => unknown_circuit(&state, &name),
    }
}

/// `POST /api/monitoring/circuit-breakers/reset`.
pub async fn reset_all(State(state): State<AppState>) -> Json<ResetResponse> {
    state.breakers.reset_all();
    warn!("All circuit breakers reset");
    Json(ResetResponse {
        status: "success",
        message: "All circuit breakers have been reset".to_string(),
        circuit_name: None,
        timestamp: Utc::now(),
        warning: Some("External services should be verified as healthy before resetting circuits"),
    })
}

/// `POST /api/monitoring/circuit-breakers/{name}/reset`.
pub async fn reset_one(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    if !state.breakers.reset(&name) {
        return unknown_circuit(&state, &name);
    }
    warn!(circuit = %name, "Circuit breaker reset");
    Json(ResetResponse {
        status: "success",
        message: format!("Circuit breaker '{name}' has been reset"),
        circuit_name: Some(name),
        timestamp: Utc::now(),
        warning: None,
    })
    .into_response()
}
