//! NASA APOD client.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

use super::http::{base_url, endpoint, redact, HttpFetcher};
use crate::domain::apod::{Apod, ApodRequest};
use crate::error::FetchError;
use crate::port::outbound::upstream::{ApodResponse, ApodSource};

const APOD_PATH: &str = "planetary/apod";

/// Direct client for `api.nasa.gov`.
pub struct NasaClient {
    http: HttpFetcher,
    base_url: Url,
    api_key: String,
}

impl NasaClient {
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
}

#[async_trait]
impl ApodSource for NasaClient {
    async fn apod(&self, request: &ApodRequest) -> Result<ApodResponse, FetchError> {
        let mut query = vec![("api_key", self.api_key.clone())];
        query.extend(request.query_pairs());
        let url = endpoint(&self.base_url, APOD_PATH, &query)?;

        info!(url = %redact(&url), "Fetching APOD");
        let body = self.http.get_value(url).await?;
        decode_apod(body)
    }
}

/// Decode a single APOD object or a list of them.
///
/// List entries that do not decode are skipped; a list with nothing usable
/// is a decode error.
pub fn decode_apod(body: Value) -> Result<ApodResponse, FetchError> {
    match body {
        Value::Array(items) => {
            let total = items.len();
            let parsed: Vec<Apod> = items
                .into_iter()
                .filter_map(|item| match serde_json::from_value::<Apod>(item) {
                    Ok(apod) => Some(apod),
                    Err(err) => {
                        warn!(error = %err, "Skipping malformed APOD entry");
                        None
                    }
                })
                .collect();
            if parsed.is_empty() {
                return Err(FetchError::decode(format!(
                    "no valid APOD entries in response ({total} received)"
                )));
            }
            Ok(ApodResponse::Many(parsed))
        }
        Value::Object(_) => serde_json::from_value(body)
            .map(ApodResponse::Single)
            .map_err(|err| FetchError::decode(err.to_string())),
        other => Err(FetchError::decode(format!(
            "unexpected APOD response shape: {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
