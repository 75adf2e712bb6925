//! GIPHY client.

use async_trait::async_trait;
use tracing::info;
use url::Url;

use super::http::{base_url, endpoint, redact, HttpFetcher};
use crate::domain::gif::{Gif, GifEnvelope, GifPage, GifParams};
use crate::error::FetchError;
use crate::port::outbound::upstream::GifSource;

/// Direct client for `api.giphy.com`. Requires an API key.
pub struct GiphyClient {
    http: HttpFetcher,
    base_url: Url,
    api_key: String,
}

impl GiphyClient {
    /// # Errors
    ///
    /// Returns an error if `base` is not a valid URL.
    pub fn new(
        http: HttpFetcher,
        base: &str,
        api_key: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            http,
            base_url: base_url(base)?,
            api_key: api_key.into(),
        })
    }

    fn url(&self, path: &str, extra: Vec<(&'static str, String)>) -> Result<Url, FetchError> {
        let mut query = vec![("api_key", self.api_key.clone())];
        query.extend(extra);
        endpoint(&self.base_url, path, &query)
    }

    async fn list(&self, path: &str, params: &GifParams) -> Result<GifPage, FetchError> {
        let url = self.url(path, params.query_pairs())?;
        info!(url = %redact(&url), "Fetching GIFs");
        self.http.get_json(url).await
    }
}

#[async_trait]
impl GifSource for GiphyClient {
    async fn trending(&self, params: &GifParams) -> Result<GifPage, FetchError> {
        let params = GifParams {
            q: None,
            ..params.clone()
        };
        self.list("gifs/trending", &params).await
    }

    async fn search(&self, params: &GifParams) -> Result<GifPage, FetchError> {
        self.list("gifs/search", params).await
    }

    async fn random(&self, params: &GifParams) -> Result<Gif, FetchError> {
        let mut extra = Vec::new();
        if let Some(tag) = &params.tag {
            extra.push(("tag", tag.clone()));
        }
        if let Some(rating) = &params.rating {
            extra.push(("rating", rating.clone()));
        }
        let url = self.url("gifs/random", extra)?;
        info!(url = %redact(&url), "Fetching random GIF");
        let envelope: GifEnvelope = self.http.get_json(url).await?;
        Ok(envelope.data)
    }

    async fn gif(&self, id: &str) -> Result<Gif, FetchError> {
        let url = self.url(&format!("gifs/{id}"), Vec::new())?;
        info!(url = %redact(&url), "Fetching GIF");
        let envelope: GifEnvelope = self.http.get_json(url).await?;
        Ok(envelope.data)
    }
}
