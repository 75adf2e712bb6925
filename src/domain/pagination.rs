//! Cursor extraction for paginated upstream responses.
//!
//! Two envelope shapes are in play:
//! - page-numbered: `{info: {count, pages, next, prev}, results}` where
//!   `next`/`prev` are absolute URLs carrying a `page` query parameter;
//! - offset-based: `{data, pagination: {total_count, count, offset}}`.
//!
//! Cursor extraction never fails loudly. Anything that does not yield a
//! positive page number is "no further page".

use serde::{Deserialize, Serialize};
use url::Url;

/// Pagination metadata of a page-numbered envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

impl PageInfo {
    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        self.next.as_deref().and_then(page_from_url)
    }

    #[must_use]
    pub fn prev_page(&self) -> Option<u32> {
        self.prev.as_deref().and_then(page_from_url)
    }
}

/// A page-numbered envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub info: PageInfo,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// A single page holding every item, as returned by non-paginated lookups.
    #[must_use]
    pub fn single(results: Vec<T>) -> Self {
        Self {
            info: PageInfo {
                count: results.len() as u64,
                pages: 1,
                next: None,
                prev: None,
            },
            results,
        }
    }
}

/// Offset pagination block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetPagination {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub offset: u64,
}

impl OffsetPagination {
    /// Offset of the following page, if any items remain.
    ///
    /// An empty page never advances, which guards against upstreams that
    /// report a `total_count` they will not actually serve.
    #[must_use]
    pub fn next_offset(&self) -> Option<u64> {
        if self.count == 0 {
            return None;
        }
        let next = self.offset.checked_add(self.count)?;
        (next < self.total_count).then_some(next)
    }

    /// Offset of the preceding page for a page size of `limit`.
    #[must_use]
    pub fn prev_offset(&self, limit: u64) -> Option<u64> {
        (self.offset > 0).then(|| self.offset.saturating_sub(limit))
    }
}

/// Anything that can point at its neighbours.
pub trait Paginated {
    type Cursor: Clone + Send + Sync + 'static;

    fn next_cursor(&self) -> Option<Self::Cursor>;

    fn prev_cursor(&self) -> Option<Self::Cursor> {
        None
    }
}

impl<T> Paginated for Page<T> {
    type Cursor = u32;

    fn next_cursor(&self) -> Option<u32> {
        self.info.next_page()
    }

    fn prev_cursor(&self) -> Option<u32> {
        self.info.prev_page()
    }
}

/// Extract the `page` query parameter from a cursor URL.
///
/// Absolute URLs are parsed as-is; relative ones (`?page=3`,
/// `/api/character?page=3`) are resolved against a placeholder origin. The
/// first `page` parameter wins.
#[must_use]
pub fn page_from_url(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse("http://localhost/").ok()?.join(raw).ok()?
        }
        Err(_) => return None,
    };

    let (_, value) = url.query_pairs().find(|(name, _)| name == "page")?;
    let page = value.trim().parse::<u32>().ok()?;
    (page > 0).then_some(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(next: Option<&str>, prev: Option<&str>) -> PageInfo {
        PageInfo {
            count: 826,
            pages: 42,
            next: next.map(str::to_string),
            prev: prev.map(str::to_string),
        }
    }

    #[test]
    fn next_page_from_absolute_url() {
        let info = info(
            Some("https://rickandmortyapi.com/api/character/?page=3"),
            Some("https://rickandmortyapi.com/api/character/?page=1"),
        );
        assert_eq!(info.next_page(), Some(3));
        assert_eq!(info.prev_page(), Some(1));
    }

    #[test]
    fn page_among_other_params() {
        assert_eq!(
            page_from_url("https://rickandmortyapi.com/api/character/?name=rick&page=7&status=alive"),
            Some(7)
        );
    }

    #[test]
    fn absent_cursor_is_no_page() {
        let info = info(None, None);
        assert_eq!(info.next_page(), None);
        assert_eq!(info.prev_page(), None);
    }

    #[test]
    fn malformed_cursors_are_no_page() {
        for raw in [
            "https://rickandmortyapi.com/api/character/",
            "https://rickandmortyapi.com/api/character/?name=rick",
            "https://rickandmortyapi.com/api/character/?page=abc",
            "https://rickandmortyapi.com/api/character/?page=",
            "https://rickandmortyapi.com/api/character/?page=0",
            "https://rickandmortyapi.com/api/character/?page=-2",
            "https://rickandmortyapi.com/api/character/?page=99999999999",
            "http://[::1",
            "",
            "   ",
            "not a url at all",
        ] {
            assert_eq!(page_from_url(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn relative_cursor() {
        assert_eq!(page_from_url("?page=3"), Some(3));
        assert_eq!(page_from_url("/api/character?page=4"), Some(4));
    }

    #[test]
    fn page_envelope_cursor_trait() {
        let page: Page<u32> = Page {
            info: info(Some("https://x.test/api/episode?page=2"), None),
            results: vec![1, 2, 3],
        };
        assert_eq!(page.next_cursor(), Some(2));
        assert_eq!(page.prev_cursor(), None);
    }

    #[test]
    fn deserialize_null_cursors() {
        let json = r#"{"info":{"count":1,"pages":1,"next":null,"prev":null},"results":[1]}"#;
        let page: Page<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(page.next_cursor(), None);
        assert_eq!(page.results, vec![1]);
    }

    #[test]
    fn offset_pagination() {
        let first = OffsetPagination {
            total_count: 45,
            count: 20,
            offset: 0,
        };
        assert_eq!(first.next_offset(), Some(20));
        assert_eq!(first.prev_offset(20), None);

        let last = OffsetPagination {
            total_count: 45,
            count: 5,
            offset: 40,
        };
        assert_eq!(last.next_offset(), None);
        assert_eq!(last.prev_offset(20), Some(20));

        let empty = OffsetPagination {
            total_count: 100,
            count: 0,
            offset: 0,
        };
        assert_eq!(empty.next_offset(), None);
    }
}
