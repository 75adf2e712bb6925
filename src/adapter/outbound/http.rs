//! Shared GET wrapper for every upstream.
//!
//! One `reqwest` client (and connection pool) per process. Every call is
//! bounded by the configured timeout and resolves to exactly one of: decoded
//! value, [`FetchError::Api`] (non-2xx), [`FetchError::Network`] (request
//! never completed) or [`FetchError::Decode`] (2xx with an unusable body).
//!
//! Timeouts and connection failures are retried with doubling backoff; API
//! errors never are.

use std::time::Duration;

use rand::Rng;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, NetworkErrorKind};
use crate::infrastructure::config::upstream::HttpConfig;

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("GrabSomeAPIs/", env!("CARGO_PKG_VERSION"));

/// Upper bound on a single backoff sleep.
const MAX_BACKOFF_MS: u64 = 30_000;

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: HttpClient,
    retry_max_attempts: u32,
    retry_backoff_ms: u64,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Client with library defaults and a single attempt per request.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: Self::builder()
                .build()
                .unwrap_or_else(|_| HttpClient::new()),
            retry_max_attempts: 1,
            retry_backoff_ms: 0,
        }
    }

    #[must_use]
    pub fn from_config(config: &HttpConfig) -> Self {
        let http = Self::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            retry_max_attempts: config.retry_max_attempts,
            retry_backoff_ms: config.retry_backoff_ms,
        }
    }

    fn builder() -> reqwest::ClientBuilder {
        HttpClient::builder().user_agent(USER_AGENT)
    }

    /// GET `url` and decode the JSON body as `T`.
    pub async fn get_json<T>(&self, url: Url) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
    {
        let body = self.get_bytes(url.clone()).await?;
        serde_json::from_slice(&body).map_err(|err| {
            warn!(url = %redact(&url), error = %err, "Failed to decode response body");
            FetchError::decode(err.to_string())
        })
    }

    /// GET `url` and return the raw JSON value.
    pub async fn get_value(&self, url: Url) -> Result<Value, FetchError> {
        self.get_json(url).await
    }

    async fn get_bytes(&self, url: Url) -> Result<Vec<u8>, FetchError> {
        let mut attempt = 0;
        let max_attempts = self.retry_max_attempts.max(1);

        loop {
            attempt += 1;
            debug!(url = %redact(&url), attempt, max_attempts, "GET");

            let response = self
                .http
                .get(url.clone())
                .header(ACCEPT, HeaderValue::from_static("application/json"))
                .send()
                .await;

            let response = match response {
                Ok(response) => response,
                Err(err) => {
                    let err = network_error(err);
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(err);
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = error_message(status.as_u16(), &body);
                debug!(
                    url = %redact(&url),
                    status = status.as_u16(),
                    message = %message,
                    "Upstream returned error status"
                );
                return Err(FetchError::api(status.as_u16(), message));
            }

            match response.bytes().await {
                Ok(bytes) => return Ok(bytes.to_vec()),
                Err(err) => {
                    let err = network_error(err);
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(err);
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                }
            }
        }
    }

    fn should_retry(err: &FetchError) -> bool {
        matches!(
            err,
            FetchError::Network {
                kind: NetworkErrorKind::Timeout | NetworkErrorKind::Connect,
                ..
            }
        )
    }

    async fn backoff(&self, attempt: u32, max_attempts: u32, err: &FetchError) {
        let delay = backoff_delay(self.retry_backoff_ms, attempt);
        warn!(
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "HTTP request failed, retrying"
        );
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`
/// plus up to 10% jitter, capped at 30s.
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    if base_ms == 0 {
        return Duration::ZERO;
    }
    let exp = attempt.saturating_sub(1).min(16);
    let delay = base_ms.saturating_mul(1_u64 << exp).min(MAX_BACKOFF_MS);
    let jitter = rand::thread_rng().gen_range(0..=delay / 10);
    Duration::from_millis(delay.saturating_add(jitter).min(MAX_BACKOFF_MS))
}

fn network_error(err: reqwest::Error) -> FetchError {
    let kind = if err.is_timeout() {
        NetworkErrorKind::Timeout
    } else if err.is_connect() {
        NetworkErrorKind::Connect
    } else {
        NetworkErrorKind::Other
    };
    // The URL may carry an api_key.
    let message = err.without_url().to_string();
    FetchError::network(kind, message)
}

/// Human-readable message for a failed response.
///
/// Looks for the first string in `detail`, `message`, `msg`, `error`,
/// `error.message`, `meta.msg`; otherwise falls back to a fixed message for
/// well-known statuses or a generic one.
#[must_use]
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(message) = structured_message(&json) {
            return message;
        }
    }
    fallback_message(status)
}

fn structured_message(json: &Value) -> Option<String> {
    let candidates = [
        json.get("detail"),
        json.get("message"),
        json.get("msg"),
        json.get("error"),
        json.get("error").and_then(|e| e.get("message")),
        json.get("meta").and_then(|m| m.get("msg")),
    ];
    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[must_use]
pub fn fallback_message(status: u16) -> String {
    match status {
        401 => "Unauthorized - invalid API key".to_string(),
        403 => "Forbidden - quota exceeded or insufficient permissions".to_string(),
        404 => "Resource not found".to_string(),
        429 => "Rate limit exceeded".to_string(),
        other => format!("Request failed with status {other}"),
    }
}

/// Parse a base URL, making sure relative joins append to its path.
pub fn base_url(raw: &str) -> Result<Url, url::ParseError> {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("{trimmed}/"))
    }
}

/// Join `path` onto `base` and append query pairs.
pub fn endpoint<K, V>(base: &Url, path: &str, query: &[(K, V)]) -> Result<Url, FetchError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut url = base.join(path.trim_start_matches('/')).map_err(|err| {
        FetchError::network(NetworkErrorKind::Other, format!("invalid request URL: {err}"))
    })?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in query {
            pairs.append_pair(name.as_ref(), value.as_ref());
        }
    }
    Ok(url)
}

/// URL for logs, with credentials masked.
#[must_use]
pub fn redact(url: &Url) -> String {
    let mut out = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "api_key" { "***".into() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    if pairs.is_empty() {
        return out.to_string();
    }
    out.query_pairs_mut().clear().extend_pairs(pairs);
    out.to_string()
}
