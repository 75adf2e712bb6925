//! `/api/v1/giphy`.
//!
//! The GIPHY key never leaves the server; without one every route here
//! answers 503.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use tracing::info;

use super::error::{ProxyError, Upstream};
use super::state::{AppState, GIPHY_BREAKER};
use crate::domain::gif::{validate_gif_id, Gif, GifPage, GifParams};
use crate::port::outbound::upstream::GifSource;

fn source(state: &AppState) -> Result<Arc<dyn GifSource>, ProxyError> {
    state
        .upstreams
        .gifs
        .clone()
        .ok_or_else(|| ProxyError::Unavailable("GIPHY API key not configured".to_string()))
}

fn params(
    raw: Result<Query<GifParams>, QueryRejection>,
    require_query: bool,
) -> Result<GifParams, ProxyError> {
    let Query(params) = raw.map_err(|rejection| ProxyError::rejected_query(&rejection))?;
    Ok(params.validate(require_query)?)
}

/// `GET /api/v1/giphy/trending`.
pub async fn trending(
    State(state): State<AppState>,
    raw: Result<Query<GifParams>, QueryRejection>,
) -> Result<Json<GifPage>, ProxyError> {
    let gifs = source(&state)?;
    let params = params(raw, false)?;
    info!(limit = ?params.limit, offset = ?params.offset, "Trending GIFs request");

    let page = state
        .breaker(GIPHY_BREAKER)
        .call(|| async move { gifs.trending(&params).await })
        .await
        .map_err(|err| ProxyError::upstream(Upstream::Giphy, err))?;
    Ok(Json(page))
}

/// `GET /api/v1/giphy/search?q=`.
pub async fn search(
    State(state): State<AppState>,
    raw: Result<Query<GifParams>, QueryRejection>,
) -> Result<Json<GifPage>, ProxyError> {
    let gifs = source(&state)?;
    let params = params(raw, true)?;
    info!(q = ?params.q, offset = ?params.offset, "GIF search request");

    let page = state
        .breaker(GIPHY_BREAKER)
        .call(|| async move { gifs.search(&params).await })
        .await
        .map_err(|err| ProxyError::upstream(Upstream::Giphy, err))?;
    Ok(Json(page))
}

/// `GET /api/v1/giphy/random`.
pub async fn random(
    State(state): State<AppState>,
    raw: Result<Query<GifParams>, QueryRejection>,
) -> Result<Json<Gif>, ProxyError> {
    let gifs = source(&state)?;
    let params = params(raw, false)?;
    info!(tag = ?params.tag, "Random GIF request");

    let gif = state
        .breaker(GIPHY_BREAKER)
        .call(|| async move { gifs.random(&params).await })
        .await
        .map_err(|err| ProxyError::upstream(Upstream::Giphy, err))?;
    Ok(Json(gif))
}

/// `GET /api/v1/giphy/gif/{id}`.
pub async fn gif(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Gif>, ProxyError> {
    let gifs = source(&state)?;
    let id = validate_gif_id(&raw_id)?.to_string();
    info!(id = %id, "GIF lookup request");

    let gif = state
        .breaker(GIPHY_BREAKER)
        .call(|| async move { gifs.gif(&id).await })
        .await
        .map_err(|err| ProxyError::upstream(Upstream::Giphy, err))?;
    Ok(Json(gif))
}
