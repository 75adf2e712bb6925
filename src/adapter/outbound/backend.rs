//! Client for the grabapis backend proxy.
//!
//! The dashboard never holds third-party credentials: it talks to the proxy,
//! which forwards to the real APIs. Response shapes are identical to the
//! direct clients, so this type implements the same ports.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;
use url::Url;

use super::http::{base_url, endpoint, HttpFetcher};
use super::nasa::decode_apod;
use super::rickandmorty::decode_characters;
use crate::domain::apod::ApodRequest;
use crate::domain::catalog::{CatalogPage, CatalogQuery};
use crate::domain::character::{
    Character, CharacterFilter, CharacterIds, Episode, EpisodeFilter, Location, LocationFilter,
};
use crate::domain::gif::{Gif, GifPage, GifParams};
use crate::domain::pagination::Page;
use crate::error::FetchError;
use crate::port::outbound::upstream::{
    ApodResponse, ApodSource, CatalogSource, CharacterSource, GifSource,
};

pub struct BackendClient {
    http: HttpFetcher,
    base_url: Url,
}

impl BackendClient {
    /// # Errors
    ///
    /// Returns an error if `base` is not a valid URL.
    pub fn new(http: HttpFetcher, base: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            http,
            base_url: base_url(base)?,
        })
    }

    async fn get<T>(&self, path: &str, query: &[(&'static str, String)]) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
    {
        let url = endpoint(&self.base_url, path, query)?;
        info!(url = %url, "Backend request");
        self.http.get_json(url).await
    }
}

#[async_trait]
impl CatalogSource for BackendClient {
    /// `GET /api/apis`.
    async fn catalog(&self, query: &CatalogQuery) -> Result<CatalogPage, FetchError> {
        let mut pairs = Vec::new();
        if let Some(page) = query.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(per_page) = query.per_page {
            pairs.push(("per_page", per_page.to_string()));
        }
        if let Some(category) = &query.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(search) = &query.search {
            pairs.push(("search", search.clone()));
        }
        self.get("api/apis", &pairs).await
    }
}

#[async_trait]
impl ApodSource for BackendClient {
    async fn apod(&self, request: &ApodRequest) -> Result<ApodResponse, FetchError> {
        let body: Value = self.get("api/v1/nasa/apod", &request.query_pairs()).await?;
        decode_apod(body)
    }
}

#[async_trait]
impl CharacterSource for BackendClient {
    async fn characters(&self, filter: &CharacterFilter) -> Result<Page<Character>, FetchError> {
        self.get("api/v1/rickandmorty/character", &filter.query_pairs())
            .await
    }

    async fn characters_by_ids(&self, ids: &CharacterIds) -> Result<Vec<Character>, FetchError> {
        let path = format!("api/v1/rickandmorty/character/{}", ids.to_path());
        let body: Value = self.get(&path, &[]).await?;
        decode_characters(body)
    }

    async fn locations(&self, filter: &LocationFilter) -> Result<Page<Location>, FetchError> {
        self.get("api/v1/rickandmorty/location", &filter.query_pairs())
            .await
    }

    async fn episodes(&self, filter: &EpisodeFilter) -> Result<Page<Episode>, FetchError> {
        self.get("api/v1/rickandmorty/episode", &filter.query_pairs())
            .await
    }
}

#[async_trait]
impl GifSource for BackendClient {
    async fn trending(&self, params: &GifParams) -> Result<GifPage, FetchError> {
        self.get("api/v1/giphy/trending", &params.query_pairs()).await
    }

    async fn search(&self, params: &GifParams) -> Result<GifPage, FetchError> {
        self.get("api/v1/giphy/search", &params.query_pairs()).await
    }

    async fn random(&self, params: &GifParams) -> Result<Gif, FetchError> {
        let mut pairs = Vec::new();
        if let Some(tag) = &params.tag {
            pairs.push(("tag", tag.clone()));
        }
        if let Some(rating) = &params.rating {
            pairs.push(("rating", rating.clone()));
        }
        self.get("api/v1/giphy/random", &pairs).await
    }

    async fn gif(&self, id: &str) -> Result<Gif, FetchError> {
        self.get(&format!("api/v1/giphy/gif/{id}"), &[]).await
    }
}
