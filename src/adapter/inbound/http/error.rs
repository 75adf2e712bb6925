//! Mapping of proxy failures to HTTP responses.
//!
//! Upstream failures are translated per service so the dashboard gets a
//! stable status and a readable `detail` regardless of how the third party
//! phrased its error.

use std::fmt;

use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::error::{FieldError, ValidationError};
use crate::error::FetchError;

/// The service a proxied request was meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Nasa,
    /// `resource` is the singular noun used in 404 messages.
    RickAndMorty { resource: &'static str },
    Giphy,
}

impl Upstream {
    pub const CHARACTER: Self = Self::RickAndMorty {
        resource: "Character",
    };
    pub const LOCATION: Self = Self::RickAndMorty {
        resource: "Location",
    };
    pub const EPISODE: Self = Self::RickAndMorty {
        resource: "Episode",
    };

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nasa => "NASA API",
            Self::RickAndMorty { .. } => "Rick and Morty API",
            Self::Giphy => "GIPHY API",
        }
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{upstream}: {source}")]
    Upstream {
        upstream: Upstream,
        #[source]
        source: FetchError,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unavailable(String),
}

impl ProxyError {
    #[must_use]
    pub fn upstream(upstream: Upstream, source: FetchError) -> Self {
        Self::Upstream { upstream, source }
    }

    /// Extractor rejections (`?page=abc`) reported like any other invalid
    /// field.
    #[must_use]
    pub fn rejected_query(rejection: &QueryRejection) -> Self {
        Self::Validation(ValidationError::single(FieldError::value(
            "query",
            rejection.body_text(),
        )))
    }

    /// Status and `detail` text for this failure.
    #[must_use]
    pub fn status_and_detail(&self) -> (StatusCode, String) {
        match self {
            Self::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::NotFound(detail) => (StatusCode::NOT_FOUND, detail.clone()),
            Self::Unavailable(detail) => (StatusCode::SERVICE_UNAVAILABLE, detail.clone()),
            Self::Upstream { upstream, source } => upstream_status(*upstream, source),
        }
    }
}

fn upstream_status(upstream: Upstream, source: &FetchError) -> (StatusCode, String) {
    match source {
        FetchError::Network { .. } | FetchError::CircuitOpen { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("{upstream} temporarily unavailable"),
        ),
        FetchError::Decode { message } => (
            StatusCode::BAD_GATEWAY,
            format!("Invalid response from {upstream}: {message}"),
        ),
        FetchError::Api { status, message } => match (upstream, *status) {
            (Upstream::Nasa, 403) => (
                StatusCode::FORBIDDEN,
                "Invalid NASA API key or quota exceeded".to_string(),
            ),
            (Upstream::Nasa, 404) => (
                StatusCode::NOT_FOUND,
                "Requested APOD data not found".to_string(),
            ),
            (Upstream::Nasa, _) => (StatusCode::BAD_REQUEST, format!("NASA API error: {message}")),
            (Upstream::RickAndMorty { resource }, 404) => {
                (StatusCode::NOT_FOUND, format!("{resource} not found"))
            }
            (Upstream::RickAndMorty { .. }, _) => (
                StatusCode::BAD_REQUEST,
                "Rick and Morty API error".to_string(),
            ),
            (Upstream::Giphy, 401 | 403) => (
                StatusCode::FORBIDDEN,
                "Invalid GIPHY API key or quota exceeded".to_string(),
            ),
            (Upstream::Giphy, 404) => (StatusCode::NOT_FOUND, "GIF not found".to_string()),
            (Upstream::Giphy, _) => (
                StatusCode::BAD_REQUEST,
                format!("GIPHY API error: {message}"),
            ),
        },
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        if let Self::Validation(err) = &self {
            debug!(error = %err, "Rejected request");
            let body = json!({
                "error": "Validation failed",
                "details": err.details,
            });
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }

        let (status, detail) = self.status_and_detail();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self, "Upstream request failed");
        } else {
            debug!(status = status.as_u16(), error = %self, "Upstream request rejected");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
