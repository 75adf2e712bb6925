//! GIPHY records and request parameters.

use serde::{Deserialize, Serialize};

use super::error::{FieldError, ValidationError};
use super::pagination::{OffsetPagination, Paginated};

pub const DEFAULT_LIMIT: u32 = 25;
pub const MAX_LIMIT: u32 = 50;
pub const MAX_OFFSET: u64 = 4999;
pub const RATINGS: [&str; 4] = ["g", "pg", "pg-13", "r"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GifRendition {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub width: String,
    #[serde(default)]
    pub height: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GifImages {
    #[serde(default)]
    pub original: GifRendition,
    #[serde(default)]
    pub fixed_height: GifRendition,
    #[serde(default)]
    pub fixed_width_small: GifRendition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gif {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub images: GifImages,
}

impl Gif {
    /// Best preview URL: fixed height, then original.
    #[must_use]
    pub fn preview_url(&self) -> Option<&str> {
        [&self.images.fixed_height.url, &self.images.original.url]
            .into_iter()
            .map(String::as_str)
            .find(|u| !u.is_empty())
    }
}

/// A page of GIFs with offset pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GifPage {
    #[serde(default)]
    pub data: Vec<Gif>,
    #[serde(default)]
    pub pagination: OffsetPagination,
}

impl Paginated for GifPage {
    type Cursor = u64;

    fn next_cursor(&self) -> Option<u64> {
        self.pagination.next_offset()
    }

    fn prev_cursor(&self) -> Option<u64> {
        let limit = u64::try_from(self.data.len()).unwrap_or(u64::MAX).max(1);
        self.pagination.prev_offset(limit)
    }
}

/// Single-object envelope used by `/gifs/{id}` and `/gifs/random`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GifEnvelope {
    pub data: Gif,
}

/// Raw query parameters for the list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GifParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Tag filter for `/random`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl GifParams {
    #[must_use]
    pub fn search(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_offset(&self, offset: u64) -> Self {
        Self {
            offset: Some(offset),
            ..self.clone()
        }
    }

    /// Validate common list parameters; `require_query` for `/search`.
    pub fn validate(&self, require_query: bool) -> Result<Self, ValidationError> {
        let mut errors = Vec::new();
        let trimmed = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let q = trimmed(&self.q);
        if require_query && q.is_none() {
            errors.push(FieldError::missing("q", "Search query 'q' is required"));
        }
        if let Some(limit) = self.limit {
            if !(1..=MAX_LIMIT).contains(&limit) {
                errors.push(FieldError::value(
                    "limit",
                    format!("Limit must be between 1 and {MAX_LIMIT}. Got: {limit}"),
                ));
            }
        }
        if let Some(offset) = self.offset {
            if offset > MAX_OFFSET {
                errors.push(FieldError::value(
                    "offset",
                    format!("Offset must be at most {MAX_OFFSET}. Got: {offset}"),
                ));
            }
        }
        let rating = trimmed(&self.rating).map(|r| r.to_ascii_lowercase());
        if let Some(r) = &rating {
            if !RATINGS.contains(&r.as_str()) {
                errors.push(FieldError::value(
                    "rating",
                    format!("Invalid rating '{r}'. Expected one of: {}", RATINGS.join(", ")),
                ));
            }
        }

        if !errors.is_empty() {
            return Err(ValidationError::new(errors));
        }
        Ok(Self {
            q,
            limit: self.limit,
            offset: self.offset,
            rating,
            lang: trimmed(&self.lang),
            tag: trimmed(&self.tag),
        })
    }

    /// Upstream query pairs (without credentials).
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(q) = &self.q {
            pairs.push(("q", q.clone()));
        }
        pairs.push(("limit", self.limit.unwrap_or(DEFAULT_LIMIT).to_string()));
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(rating) = &self.rating {
            pairs.push(("rating", rating.clone()));
        }
        if let Some(lang) = &self.lang {
            pairs.push(("lang", lang.clone()));
        }
        pairs
    }
}

/// Validate a GIF id path segment (alphanumeric).
pub fn validate_gif_id(raw: &str) -> Result<&str, ValidationError> {
    let id = raw.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::single(FieldError::value(
            "gif_id",
            format!("Invalid GIF id '{raw}'"),
        )));
    }
    Ok(id)
}
