//! Upstream data-source ports.
//!
//! One trait per third-party service. Implemented both by the direct HTTP
//! clients (used by the proxy) and by the proxy client (used by the
//! dashboard), so the query layer does not care which side of the proxy it
//! runs on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::apod::{Apod, ApodRequest};
use crate::domain::catalog::{CatalogPage, CatalogQuery};
use crate::domain::character::{
    Character, CharacterFilter, CharacterIds, Episode, EpisodeFilter, Location, LocationFilter,
};
use crate::domain::gif::{Gif, GifPage, GifParams};
use crate::domain::pagination::Page;
use crate::error::FetchError;

/// APOD answers with one object for single-date queries and a list for
/// ranges and random counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApodResponse {
    Single(Apod),
    Many(Vec<Apod>),
}

impl ApodResponse {
    #[must_use]
    pub fn into_vec(self) -> Vec<Apod> {
        match self {
            Self::Single(apod) => vec![apod],
            Self::Many(items) => items,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(items) => items.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// NASA Astronomy Picture of the Day.
#[async_trait]
pub trait ApodSource: Send + Sync {
    async fn apod(&self, request: &ApodRequest) -> Result<ApodResponse, FetchError>;
}

/// Rick and Morty database.
#[async_trait]
pub trait CharacterSource: Send + Sync {
    async fn characters(&self, filter: &CharacterFilter) -> Result<Page<Character>, FetchError>;

    /// Characters by id, in ascending id order.
    async fn characters_by_ids(&self, ids: &CharacterIds) -> Result<Vec<Character>, FetchError>;

    async fn locations(&self, filter: &LocationFilter) -> Result<Page<Location>, FetchError>;

    async fn episodes(&self, filter: &EpisodeFilter) -> Result<Page<Episode>, FetchError>;
}

/// GIPHY.
#[async_trait]
pub trait GifSource: Send + Sync {
    async fn trending(&self, params: &GifParams) -> Result<GifPage, FetchError>;

    async fn search(&self, params: &GifParams) -> Result<GifPage, FetchError>;

    /// One random GIF; honours `tag` and `rating`.
    async fn random(&self, params: &GifParams) -> Result<Gif, FetchError>;

    async fn gif(&self, id: &str) -> Result<Gif, FetchError>;
}

/// Directory of the integrated APIs.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn catalog(&self, query: &CatalogQuery) -> Result<CatalogPage, FetchError>;
}
