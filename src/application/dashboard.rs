//! Dashboard service: typed, cached queries over the upstream ports and the
//! persisted preferences.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use tracing::debug;

use crate::application::query::client::QueryClient;
use crate::application::query::infinite::InfiniteQuery;
use crate::application::query::policy::{QueryOptions, QueryPolicies};
use crate::domain::apod::{ApodRequest, ApodSelection, FIRST_APOD_DATE};
use crate::domain::catalog::{CatalogPage, CatalogQuery};
use crate::domain::character::{
    Character, CharacterFilter, CharacterIds, Episode, EpisodeFilter, Location, LocationFilter,
};
use crate::domain::gif::{validate_gif_id, Gif, GifPage, GifParams};
use crate::domain::pagination::Page;
use crate::domain::prefetch::adjacent_dates;
use crate::domain::preferences::{Preferences, Tab, ViewMode};
use crate::domain::query_key::QueryKey;
use crate::error::{FetchError, Result};
use crate::port::inbound::dashboard::{DashboardPort, Feed};
use crate::port::outbound::preferences::PreferenceStore;
use crate::port::outbound::upstream::{
    ApodResponse, ApodSource, CatalogSource, CharacterSource, GifSource,
};

/// Upstream ports a dashboard reads from.
#[derive(Clone)]
pub struct DashboardSources {
    pub apods: Arc<dyn ApodSource>,
    pub characters: Arc<dyn CharacterSource>,
    /// `None` when no GIPHY key is available.
    pub gifs: Option<Arc<dyn GifSource>>,
    pub catalog: Arc<dyn CatalogSource>,
}

pub struct Dashboard {
    client: QueryClient,
    policies: QueryPolicies,
    sources: DashboardSources,
    preferences: Arc<dyn PreferenceStore>,
    /// Serialises load-modify-save of the preference record.
    preference_lock: Mutex<()>,
}

impl Dashboard {
    pub fn new(
        client: QueryClient,
        policies: QueryPolicies,
        sources: DashboardSources,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self {
            client,
            policies,
            sources,
            preferences,
            preference_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    fn options(&self, domain: &str) -> QueryOptions {
        QueryOptions::new(self.policies.for_domain(domain))
    }

    fn gif_source(&self) -> std::result::Result<Arc<dyn GifSource>, FetchError> {
        self.sources
            .gifs
            .clone()
            .ok_or_else(|| FetchError::api(503, "GIPHY API key not configured"))
    }

    /// [`DashboardPort::prefetch_adjacent`] with an explicit "today".
    pub async fn prefetch_adjacent_at(&self, date: NaiveDate, today: NaiveDate) -> Vec<NaiveDate> {
        let mut warmed = Vec::new();
        for day in adjacent_dates(date, FIRST_APOD_DATE, today).iter() {
            let request = ApodRequest::date(day);
            let source = Arc::clone(&self.sources.apods);
            let landed = self
                .client
                .prefetch(&apod_key(&request), self.policies.apod, move || async move {
                    source.apod(&request).await
                })
                .await;
            if landed {
                warmed.push(day);
            }
        }
        debug!(date = %date, warmed = warmed.len(), "Prefetched adjacent APOD dates");
        warmed
    }

    async fn gif_feed(
        &self,
        operation: &'static str,
        params: GifParams,
        pages: usize,
    ) -> Result<Feed<Gif>> {
        let source = self.gif_source()?;
        let start = params.offset.unwrap_or(0);
        let key = gif_feed_key(operation, &params, start);
        let base = params;
        let query: InfiniteQuery<GifPage> = InfiniteQuery::new(
            self.client.clone(),
            key,
            self.options("giphy"),
            move |offset: u64| {
                let source = Arc::clone(&source);
                let params = base.with_offset(offset);
                async move {
                    if operation == "search" {
                        source.search(&params).await
                    } else {
                        source.trending(&params).await
                    }
                }
            },
        );

        let data = query.load_pages(start, pages.max(1)).await?;
        Ok(Feed {
            items: data
                .pages()
                .iter()
                .flat_map(|page| page.data.iter().cloned())
                .collect(),
            pages_loaded: data.len(),
            total: data
                .pages()
                .first()
                .map_or(0, |page| page.pagination.total_count),
            has_more: data.has_next_page(),
        })
    }

    fn update_preferences<R>(&self, mutate: impl FnOnce(&mut Preferences) -> R) -> Result<R> {
        let _guard = self.preference_lock.lock();
        let mut preferences = self.preferences.load()?;
        let outcome = mutate(&mut preferences);
        self.preferences.save(&preferences)?;
        Ok(outcome)
    }
}

/// Cache key for an APOD request.
#[must_use]
pub fn apod_key(request: &ApodRequest) -> QueryKey {
    let builder = match request.selection {
        ApodSelection::Today => QueryKey::builder("nasa", "apod", "today"),
        ApodSelection::Date(date) => QueryKey::builder("nasa", "apod", "detail").param("date", date),
        ApodSelection::Range { start, end } => QueryKey::builder("nasa", "apod", "range")
            .param("start_date", start)
            .param("end_date", end),
        ApodSelection::Random { count } => {
            QueryKey::builder("nasa", "apod", "random").param("count", count)
        }
    };
    builder.param("thumbs", request.thumbs).build()
}

fn character_key(operation: &str, filter: &CharacterFilter) -> QueryKey {
    QueryKey::builder("rickandmorty", "character", operation)
        .param("name", filter.name.as_deref())
        .param("status", filter.status.as_deref())
        .param("species", filter.species.as_deref())
        .param("type", filter.kind.as_deref())
        .param("gender", filter.gender.as_deref())
        .param("page", filter.page)
        .build()
}

fn gif_feed_key(operation: &str, params: &GifParams, start: u64) -> QueryKey {
    QueryKey::builder("giphy", "gifs", operation)
        .param("q", params.q.as_deref())
        .param("limit", params.limit)
        .param("rating", params.rating.as_deref())
        .param("lang", params.lang.as_deref())
        .param("start", i64::try_from(start).unwrap_or(i64::MAX))
        .build()
}

#[async_trait]
impl DashboardPort for Dashboard {
    async fn apod(&self, request: &ApodRequest) -> Result<ApodResponse> {
        let key = apod_key(request);
        let source = Arc::clone(&self.sources.apods);
        let request = *request;
        let fetcher = move || async move { source.apod(&request).await };

        let response = if matches!(request.selection, ApodSelection::Random { .. }) {
            self.client.refetch(&key, self.policies.apod, fetcher).await?
        } else {
            self.client.fetch(&key, self.options("nasa"), fetcher).await?
        };
        Ok((*response).clone())
    }

    async fn prefetch_adjacent(&self, date: NaiveDate) -> Vec<NaiveDate> {
        self.prefetch_adjacent_at(date, Utc::now().date_naive()).await
    }

    async fn characters(&self, filter: &CharacterFilter) -> Result<Page<Character>> {
        let filter = filter.validate()?;
        let key = character_key("list", &filter);
        let source = Arc::clone(&self.sources.characters);
        let page = self
            .client
            .fetch(&key, self.options("rickandmorty"), move || async move {
                source.characters(&filter).await
            })
            .await?;
        Ok((*page).clone())
    }

    async fn character_feed(
        &self,
        filter: &CharacterFilter,
        pages: usize,
    ) -> Result<Feed<Character>> {
        let filter = filter.validate()?;
        let start = filter.page.unwrap_or(1);
        let key = character_key("infinite", &filter);
        let source = Arc::clone(&self.sources.characters);
        let query: InfiniteQuery<Page<Character>> = InfiniteQuery::new(
            self.client.clone(),
            key,
            self.options("rickandmorty"),
            move |page: u32| {
                let source = Arc::clone(&source);
                let filter = filter.with_page(page);
                async move { source.characters(&filter).await }
            },
        );

        let data = query.load_pages(start, pages.max(1)).await?;
        Ok(Feed {
            items: data
                .pages()
                .iter()
                .flat_map(|page| page.results.iter().cloned())
                .collect(),
            pages_loaded: data.len(),
            total: data.pages().first().map_or(0, |page| page.info.count),
            has_more: data.has_next_page(),
        })
    }

    async fn characters_by_ids(&self, ids: &CharacterIds) -> Result<Vec<Character>> {
        let key = QueryKey::builder("rickandmorty", "character", "detail")
            .param("ids", ids.as_slice())
            .build();
        let source = Arc::clone(&self.sources.characters);
        let ids = ids.clone();
        let characters = self
            .client
            .fetch(&key, self.options("rickandmorty"), move || async move {
                source.characters_by_ids(&ids).await
            })
            .await?;
        Ok((*characters).clone())
    }

    async fn locations(&self, filter: &LocationFilter) -> Result<Page<Location>> {
        let filter = filter.validate()?;
        let key = QueryKey::builder("rickandmorty", "location", "list")
            .param("name", filter.name.as_deref())
            .param("type", filter.kind.as_deref())
            .param("dimension", filter.dimension.as_deref())
            .param("page", filter.page)
            .build();
        let source = Arc::clone(&self.sources.characters);
        let page = self
            .client
            .fetch(&key, self.options("rickandmorty"), move || async move {
                source.locations(&filter).await
            })
            .await?;
        Ok((*page).clone())
    }

    async fn episodes(&self, filter: &EpisodeFilter) -> Result<Page<Episode>> {
        let filter = filter.validate()?;
        let key = QueryKey::builder("rickandmorty", "episode", "list")
            .param("name", filter.name.as_deref())
            .param("episode", filter.episode.as_deref())
            .param("page", filter.page)
            .build();
        let source = Arc::clone(&self.sources.characters);
        let page = self
            .client
            .fetch(&key, self.options("rickandmorty"), move || async move {
                source.episodes(&filter).await
            })
            .await?;
        Ok((*page).clone())
    }

    async fn trending_gifs(&self, params: &GifParams, pages: usize) -> Result<Feed<Gif>> {
        let params = GifParams {
            q: None,
            ..params.validate(false)?
        };
        self.gif_feed("trending", params, pages).await
    }

    async fn search_gifs(&self, params: &GifParams, pages: usize) -> Result<Feed<Gif>> {
        let params = params.validate(true)?;
        self.gif_feed("search", params, pages).await
    }

    async fn random_gif(&self, params: &GifParams) -> Result<Gif> {
        let params = params.validate(false)?;
        let source = self.gif_source()?;
        let key = QueryKey::builder("giphy", "gif", "random")
            .param("tag", params.tag.as_deref())
            .param("rating", params.rating.as_deref())
            .build();
        let gif = self
            .client
            .refetch(&key, self.policies.gifs, move || async move {
                source.random(&params).await
            })
            .await?;
        Ok((*gif).clone())
    }

    async fn gif(&self, id: &str) -> Result<Gif> {
        let id = validate_gif_id(id)?.to_string();
        let source = self.gif_source()?;
        let key = QueryKey::builder("giphy", "gif", "detail")
            .param("id", id.as_str())
            .build();
        let gif = self
            .client
            .fetch(&key, self.options("giphy"), move || async move {
                source.gif(&id).await
            })
            .await?;
        Ok((*gif).clone())
    }

    async fn catalog(&self, query: &CatalogQuery) -> Result<CatalogPage> {
        let key = QueryKey::builder("catalog", "apis", "list")
            .param("page", query.page)
            .param("per_page", query.per_page)
            .param("category", query.category.as_deref())
            .param("search", query.search.as_deref())
            .build();
        let source = Arc::clone(&self.sources.catalog);
        let query = query.clone();
        let page = self
            .client
            .fetch(&key, self.options("catalog"), move || async move {
                source.catalog(&query).await
            })
            .await?;
        Ok((*page).clone())
    }

    fn preferences(&self) -> Result<Preferences> {
        Ok(self.preferences.load()?)
    }

    fn toggle_favorite_date(&self, date: NaiveDate) -> Result<bool> {
        self.update_preferences(|prefs| prefs.toggle_date(date))
    }

    fn toggle_favorite_character(&self, id: u32) -> Result<bool> {
        self.update_preferences(|prefs| prefs.toggle_character(id))
    }

    fn toggle_favorite_gif(&self, id: &str) -> Result<bool> {
        let id = validate_gif_id(id)?;
        self.update_preferences(|prefs| prefs.toggle_gif(id))
    }

    fn set_tab(&self, tab: Tab) -> Result<()> {
        self.update_preferences(|prefs| prefs.tab = tab)
    }

    fn set_view(&self, view: ViewMode) -> Result<()> {
        self.update_preferences(|prefs| prefs.view = view)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::apod::{format_date, Apod};
    use crate::domain::pagination::PageInfo;
    use crate::error::{Error, StoreError};

    #[derive(Default)]
    struct FakeApod {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ApodSource for FakeApod {
        async fn apod(&self, request: &ApodRequest) -> std::result::Result<ApodResponse, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let date = match request.selection {
                ApodSelection::Date(date) => format_date(date),
                _ => "2024-01-01".to_string(),
            };
            Ok(ApodResponse::Single(Apod {
                title: format!("Picture {date}"),
                date,
                explanation: String::new(),
                url: "https://apod.nasa.gov/image.jpg".to_string(),
                hdurl: None,
                media_type: "image".to_string(),
                service_version: "v1".to_string(),
                copyright: None,
                thumbnail_url: None,
            }))
        }
    }

    #[derive(Default)]
    struct FakeCharacters {
        calls: AtomicUsize,
    }

    fn character(id: u32) -> Character {
        serde_json::from_value(serde_json::json!({"id": id, "name": format!("Character {id}")}))
            .unwrap()
    }

    #[async_trait]
    impl CharacterSource for FakeCharacters {
        async fn characters(
            &self,
            filter: &CharacterFilter,
        ) -> std::result::Result<Page<Character>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let page = filter.page.unwrap_or(1);
            Ok(Page {
                info: PageInfo {
                    count: 6,
                    pages: 3,
                    next: (page < 3).then(|| format!("https://x/api/character?page={}", page + 1)),
                    prev: None,
                },
                results: vec![character(page * 2 - 1), character(page * 2)],
            })
        }

        async fn characters_by_ids(
            &self,
            ids: &CharacterIds,
        ) -> std::result::Result<Vec<Character>, FetchError> {
            Ok(ids.as_slice().iter().copied().map(character).collect())
        }

        async fn locations(
            &self,
            _filter: &LocationFilter,
        ) -> std::result::Result<Page<Location>, FetchError> {
            Ok(Page::single(Vec::new()))
        }

        async fn episodes(
            &self,
            _filter: &EpisodeFilter,
        ) -> std::result::Result<Page<Episode>, FetchError> {
            Ok(Page::single(Vec::new()))
        }
    }

    struct NoCatalog;

    #[async_trait]
    impl CatalogSource for NoCatalog {
        async fn catalog(&self, _query: &CatalogQuery) -> std::result::Result<CatalogPage, FetchError> {
            Err(FetchError::api(404, "Resource not found"))
        }
    }

    #[derive(Default)]
    struct InMemoryPreferences(Mutex<Preferences>);

    impl PreferenceStore for InMemoryPreferences {
        fn load(&self) -> std::result::Result<Preferences, StoreError> {
            Ok(self.0.lock().clone())
        }

        fn save(&self, preferences: &Preferences) -> std::result::Result<(), StoreError> {
            *self.0.lock() = preferences.clone();
            Ok(())
        }
    }

    struct Fixture {
        dashboard: Dashboard,
        apods: Arc<FakeApod>,
        characters: Arc<FakeCharacters>,
        preferences: Arc<InMemoryPreferences>,
    }

    fn fixture() -> Fixture {
        let apods = Arc::new(FakeApod::default());
        let characters = Arc::new(FakeCharacters::default());
        let preferences = Arc::new(InMemoryPreferences::default());
        let dashboard = Dashboard::new(
            QueryClient::new(),
            QueryPolicies::default(),
            DashboardSources {
                apods: apods.clone(),
                characters: characters.clone(),
                gifs: None,
                catalog: Arc::new(NoCatalog),
            },
            preferences.clone(),
        );
        Fixture {
            dashboard,
            apods,
            characters,
            preferences,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn apod_by_date_is_cached() {
        let f = fixture();
        let request = ApodRequest::date(date("2024-01-01"));
        f.dashboard.apod(&request).await.unwrap();
        f.dashboard.apod(&request).await.unwrap();
        assert_eq!(f.apods.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn random_apod_always_fetches() {
        let f = fixture();
        let request = ApodRequest::random(3);
        f.dashboard.apod(&request).await.unwrap();
        f.dashboard.apod(&request).await.unwrap();
        assert_eq!(f.apods.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn prefetch_warms_neighbours_then_serves_them_from_cache() {
        let f = fixture();
        let today = date("2024-06-10");
        let warmed = f.dashboard.prefetch_adjacent_at(date("2024-06-05"), today).await;
        assert_eq!(warmed, vec![date("2024-06-04"), date("2024-06-06")]);

        f.dashboard
            .apod(&ApodRequest::date(date("2024-06-04")))
            .await
            .unwrap();
        assert_eq!(f.apods.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn prefetch_respects_boundaries() {
        let f = fixture();
        let today = date("2024-06-10");
        assert_eq!(
            f.dashboard.prefetch_adjacent_at(FIRST_APOD_DATE, today).await,
            vec![date("1995-06-17")]
        );
        assert_eq!(
            f.dashboard.prefetch_adjacent_at(today, today).await,
            vec![date("2024-06-09")]
        );
    }

    #[tokio::test]
    async fn character_feed_follows_next_links() {
        let f = fixture();
        let feed = f
            .dashboard
            .character_feed(&CharacterFilter::default(), 2)
            .await
            .unwrap();
        assert_eq!(feed.pages_loaded, 2);
        assert_eq!(feed.items.len(), 4);
        assert!(feed.has_more);
        assert_eq!(feed.total, 6);

        let all = f
            .dashboard
            .character_feed(&CharacterFilter::default(), 10)
            .await
            .unwrap();
        assert_eq!(all.items.len(), 6);
        assert!(!all.has_more);
        assert_eq!(f.characters.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn invalid_filter_never_reaches_upstream() {
        let f = fixture();
        let err = f
            .dashboard
            .characters(&CharacterFilter {
                status: Some("sleepy".to_string()),
                ..CharacterFilter::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(f.characters.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn gifs_without_source_are_unavailable() {
        let f = fixture();
        let err = f
            .dashboard
            .trending_gifs(&GifParams::default(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::Api { status: 503, .. })));
    }

    #[test]
    fn toggles_write_through() {
        let f = fixture();
        assert!(f.dashboard.toggle_favorite_character(1).unwrap());
        assert!(f.dashboard.toggle_favorite_gif("abc123").unwrap());
        assert!(!f.dashboard.toggle_favorite_character(1).unwrap());
        f.dashboard.set_view(ViewMode::List).unwrap();

        let stored = f.preferences.load().unwrap();
        assert!(!stored.is_favorite_character(1));
        assert!(stored.is_favorite_gif("abc123"));
        assert_eq!(stored.view, ViewMode::List);
    }

    #[test]
    fn apod_keys_ignore_construction_path() {
        let a = apod_key(&ApodRequest::date(date("2024-01-01")));
        let b = apod_key(
            &crate::domain::apod::ApodParams {
                date: Some("2024-01-01".to_string()),
                ..Default::default()
            }
            .validate(date("2024-06-01"))
            .unwrap(),
        );
        assert_eq!(a, b);
    }
}
