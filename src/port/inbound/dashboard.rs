//! Dashboard use-cases.
//!
//! Every read goes through the query cache; preference mutations write
//! through to the preference store.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::apod::ApodRequest;
use crate::domain::catalog::{CatalogPage, CatalogQuery};
use crate::domain::character::{
    Character, CharacterFilter, CharacterIds, Episode, EpisodeFilter, Location, LocationFilter,
};
use crate::domain::gif::{Gif, GifParams};
use crate::domain::pagination::Page;
use crate::domain::preferences::{Preferences, Tab, ViewMode};
use crate::error::Result;
use crate::port::outbound::upstream::ApodResponse;

/// Items gathered from one or more pages of an infinite query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feed<T> {
    pub items: Vec<T>,
    pub pages_loaded: usize,
    /// Total items upstream, when the service reports it.
    pub total: u64,
    pub has_more: bool,
}

#[async_trait]
pub trait DashboardPort: Send + Sync {
    async fn apod(&self, request: &ApodRequest) -> Result<ApodResponse>;

    /// Warm the cache for the days either side of `date`. Returns the dates
    /// that were fetched; failures are not reported.
    async fn prefetch_adjacent(&self, date: NaiveDate) -> Vec<NaiveDate>;

    async fn characters(&self, filter: &CharacterFilter) -> Result<Page<Character>>;

    /// Follow `next` links from the filter's page until `pages` pages are
    /// loaded or there are no more.
    async fn character_feed(&self, filter: &CharacterFilter, pages: usize)
        -> Result<Feed<Character>>;

    async fn characters_by_ids(&self, ids: &CharacterIds) -> Result<Vec<Character>>;

    async fn locations(&self, filter: &LocationFilter) -> Result<Page<Location>>;

    async fn episodes(&self, filter: &EpisodeFilter) -> Result<Page<Episode>>;

    async fn trending_gifs(&self, params: &GifParams, pages: usize) -> Result<Feed<Gif>>;

    async fn search_gifs(&self, params: &GifParams, pages: usize) -> Result<Feed<Gif>>;

    /// Never cached.
    async fn random_gif(&self, params: &GifParams) -> Result<Gif>;

    async fn gif(&self, id: &str) -> Result<Gif>;

    async fn catalog(&self, query: &CatalogQuery) -> Result<CatalogPage>;

    fn preferences(&self) -> Result<Preferences>;

    /// Returns whether the date is a favorite afterwards.
    fn toggle_favorite_date(&self, date: NaiveDate) -> Result<bool>;

    fn toggle_favorite_character(&self, id: u32) -> Result<bool>;

    fn toggle_favorite_gif(&self, id: &str) -> Result<bool>;

    fn set_tab(&self, tab: Tab) -> Result<()>;

    fn set_view(&self, view: ViewMode) -> Result<()>;
}
