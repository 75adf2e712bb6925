//! Rick and Morty API client.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::http::{base_url, endpoint, HttpFetcher};
use crate::domain::character::{
    Character, CharacterFilter, CharacterIds, Episode, EpisodeFilter, Location, LocationFilter,
};
use crate::domain::pagination::Page;
use crate::error::FetchError;
use crate::port::outbound::upstream::CharacterSource;

/// Direct client for `rickandmortyapi.com`. No credentials required.
pub struct RickAndMortyClient {
    http: HttpFetcher,
    base_url: Url,
}

impl RickAndMortyClient {
    /// # Errors
    ///
    /// Returns an error if `base` is not a valid URL.
    pub fn new(http: HttpFetcher, base: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            http,
            base_url: base_url(base)?,
        })
    }

    async fn page<T>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Page<T>, FetchError>
    where
        T: DeserializeOwned,
    {
        let url = endpoint(&self.base_url, path, query)?;
        info!(url = %url, "Fetching Rick and Morty page");
        let page: Page<T> = self.http.get_json(url).await?;
        debug!(
            count = page.results.len(),
            total = page.info.count,
            next = ?page.info.next_page(),
            "Fetched Rick and Morty page"
        );
        Ok(page)
    }
}

#[async_trait]
impl CharacterSource for RickAndMortyClient {
    async fn characters(&self, filter: &CharacterFilter) -> Result<Page<Character>, FetchError> {
        self.page("character", &filter.query_pairs()).await
    }

    async fn characters_by_ids(&self, ids: &CharacterIds) -> Result<Vec<Character>, FetchError> {
        let path = format!("character/{}", ids.to_path());
        let empty: [(&str, &str); 0] = [];
        let url = endpoint(&self.base_url, &path, &empty)?;
        info!(url = %url, ids = %ids, "Fetching characters by id");
        let body = self.http.get_value(url).await?;
        decode_characters(body)
    }

    async fn locations(&self, filter: &LocationFilter) -> Result<Page<Location>, FetchError> {
        self.page("location", &filter.query_pairs()).await
    }

    async fn episodes(&self, filter: &EpisodeFilter) -> Result<Page<Episode>, FetchError> {
        self.page("episode", &filter.query_pairs()).await
    }
}

/// `/character/{ids}` answers with an object for one id and an array for
/// several; normalise to an id-sorted list.
pub fn decode_characters(body: Value) -> Result<Vec<Character>, FetchError> {
    let mut characters: Vec<Character> = match body {
        Value::Array(_) => serde_json::from_value(body),
        Value::Object(_) => serde_json::from_value(body).map(|c| vec![c]),
        _ => return Err(FetchError::decode("expected character object or array")),
    }
    .map_err(|err| FetchError::decode(err.to_string()))?;
    characters.sort_by_key(|c| c.id);
    Ok(characters)
}
