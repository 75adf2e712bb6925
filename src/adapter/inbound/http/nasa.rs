//! `/api/v1/nasa`.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use tracing::info;

use super::error::{ProxyError, Upstream};
use super::state::{AppState, NASA_BREAKER};
use crate::domain::apod::ApodParams;
use crate::port::outbound::upstream::ApodResponse;

/// `GET /api/v1/nasa/apod`: today's picture, one date, a range or a random
/// sample.
pub async fn apod(
    State(state): State<AppState>,
    query: Result<Query<ApodParams>, QueryRejection>,
) -> Result<Json<ApodResponse>, ProxyError> {
    let Query(params) = query.map_err(|rejection| ProxyError::rejected_query(&rejection))?;
    let request = params.validate(Utc::now().date_naive())?;
    info!(selection = ?request.selection, thumbs = request.thumbs, "APOD request");

    let apods = Arc::clone(&state.upstreams.apods);
    let response = state
        .breaker(NASA_BREAKER)
        .call(|| async move { apods.apod(&request).await })
        .await
        .map_err(|err| ProxyError::upstream(Upstream::Nasa, err))?;

    info!(items = response.len(), "APOD response");
    Ok(Json(response))
}
