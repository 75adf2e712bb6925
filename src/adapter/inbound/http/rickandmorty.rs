//! `/api/v1/rickandmorty`.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;

use super::error::{ProxyError, Upstream};
use super::state::{AppState, RICK_AND_MORTY_BREAKER};
use crate::domain::character::{
    Character, CharacterFilter, CharacterIds, Episode, EpisodeFilter, Location, LocationFilter,
};
use crate::domain::pagination::Page;

fn query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ProxyError> {
    query
        .map(|Query(inner)| inner)
        .map_err(|rejection| ProxyError::rejected_query(&rejection))
}

/// `GET /api/v1/rickandmorty/character`.
pub async fn characters(
    State(state): State<AppState>,
    raw: Result<Query<CharacterFilter>, QueryRejection>,
) -> Result<Json<Page<Character>>, ProxyError> {
    let filter = query(raw)?.validate()?;
    info!(filter = ?filter, "Character list request");

    let source = Arc::clone(&state.upstreams.characters);
    let page = state
        .breaker(RICK_AND_MORTY_BREAKER)
        .call(|| async move { source.characters(&filter).await })
        .await
        .map_err(|err| ProxyError::upstream(Upstream::CHARACTER, err))?;
    Ok(Json(page))
}

/// `GET /api/v1/rickandmorty/character/{ids}`.
///
/// One id answers with the character object, several with a list, matching
/// the upstream API.
pub async fn characters_by_ids(
    State(state): State<AppState>,
    Path(raw_ids): Path<String>,
) -> Result<Response, ProxyError> {
    let ids = CharacterIds::parse(&raw_ids)?;
    info!(ids = %ids, "Character lookup request");

    let source = Arc::clone(&state.upstreams.characters);
    let lookup = ids.clone();
    let mut characters = state
        .breaker(RICK_AND_MORTY_BREAKER)
        .call(|| async move { source.characters_by_ids(&lookup).await })
        .await
        .map_err(|err| ProxyError::upstream(Upstream::CHARACTER, err))?;

    if ids.is_single() {
        return match characters.pop() {
            Some(character) => Ok(Json(character).into_response()),
            None => Err(ProxyError::NotFound("Character not found".to_string())),
        };
    }
    Ok(Json(characters).into_response())
}

/// `GET /api/v1/rickandmorty/location`.
pub async fn locations(
    State(state): State<AppState>,
    raw: Result<Query<LocationFilter>, QueryRejection>,
) -> Result<Json<Page<Location>>, ProxyError> {
    let filter = query(raw)?.validate()?;
    info!(filter = ?filter, "Location list request");

    let source = Arc::clone(&state.upstreams.characters);
    let page = state
        .breaker(RICK_AND_MORTY_BREAKER)
        .call(|| async move { source.locations(&filter).await })
        .await
        .map_err(|err| ProxyError::upstream(Upstream::LOCATION, err))?;
    Ok(Json(page))
}

/// `GET /api/v1/rickandmorty/episode`.
pub async fn episodes(
    State(state): State<AppState>,
    raw: Result<Query<EpisodeFilter>, QueryRejection>,
) -> Result<Json<Page<Episode>>, ProxyError> {
    let filter = query(raw)?.validate()?;
    info!(filter = ?filter, "Episode list request");

    let source = Arc::clone(&state.upstreams.characters);
    let page = state
        .breaker(RICK_AND_MORTY_BREAKER)
        .call(|| async move { source.episodes(&filter).await })
        .await
        .map_err(|err| ProxyError::upstream(Upstream::EPISODE, err))?;
    Ok(Json(page))
}
