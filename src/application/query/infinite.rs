//! Cursor-driven infinite queries.
//!
//! All loaded pages live under a single cache key, together with the cursor
//! each page was fetched with, so a revalidation can replay them in order.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use tracing::debug;

use super::client::QueryClient;
use super::policy::QueryOptions;
use crate::domain::pagination::Paginated;
use crate::domain::query_key::QueryKey;
use crate::error::FetchError;

type PageFetcher<P> =
    Arc<dyn Fn(<P as Paginated>::Cursor) -> BoxFuture<'static, Result<P, FetchError>> + Send + Sync>;

/// Pages loaded so far, oldest first.
pub struct InfiniteData<P: Paginated> {
    pages: Vec<P>,
    page_params: Vec<P::Cursor>,
}

impl<P: Paginated + Clone> Clone for InfiniteData<P> {
    fn clone(&self) -> Self {
        Self {
            pages: self.pages.clone(),
            page_params: self.page_params.clone(),
        }
    }
}

impl<P: Paginated> InfiniteData<P> {
    #[must_use]
    pub fn pages(&self) -> &[P] {
        &self.pages
    }

    /// Cursor each loaded page was fetched with.
    #[must_use]
    pub fn page_params(&self) -> &[P::Cursor] {
        &self.page_params
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    #[must_use]
    pub fn next_cursor(&self) -> Option<P::Cursor> {
        self.pages.last().and_then(Paginated::next_cursor)
    }

    #[must_use]
    pub fn prev_cursor(&self) -> Option<P::Cursor> {
        self.pages.first().and_then(Paginated::prev_cursor)
    }

    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.next_cursor().is_some()
    }

    #[must_use]
    pub fn has_previous_page(&self) -> bool {
        self.prev_cursor().is_some()
    }
}

/// Handle for one infinite query: the key, the page fetcher and the client
/// holding the pages.
pub struct InfiniteQuery<P: Paginated> {
    client: QueryClient,
    key: QueryKey,
    options: QueryOptions,
    fetch_page: PageFetcher<P>,
}

impl<P> InfiniteQuery<P>
where
    P: Paginated + Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(client: QueryClient, key: QueryKey, options: QueryOptions, fetch_page: F) -> Self
    where
        F: Fn(P::Cursor) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<P, FetchError>> + Send + 'static,
    {
        Self {
            client,
            key,
            options,
            fetch_page: Arc::new(move |cursor| fetch_page(cursor).boxed()),
        }
    }

    #[must_use]
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Whatever pages are cached right now.
    #[must_use]
    pub fn data(&self) -> Option<Arc<InfiniteData<P>>> {
        self.client.get_data(&self.key)
    }

    /// Load the first page starting at `initial`, or serve the cached pages.
    ///
    /// Revalidating stale pages replays every loaded cursor in order and
    /// stops early if the upstream now has fewer pages.
    ///
    /// # Errors
    ///
    /// The first page's fetch error.
    pub async fn fetch(&self, initial: P::Cursor) -> Result<Arc<InfiniteData<P>>, FetchError> {
        let cursors = match self.data() {
            Some(existing) if !existing.is_empty() => existing.page_params.clone(),
            _ => vec![initial],
        };
        let fetch_page = Arc::clone(&self.fetch_page);
        self.client
            .fetch(&self.key, self.options, move || replay(fetch_page, cursors))
            .await
    }

    /// Append the page after the last loaded one.
    ///
    /// Returns `false` without fetching when nothing is loaded yet or the
    /// last page has no successor.
    ///
    /// # Errors
    ///
    /// The page fetch error; loaded pages are kept.
    pub async fn fetch_next_page(&self) -> Result<bool, FetchError> {
        let Some(current) = self.data() else {
            return Ok(false);
        };
        let Some(cursor) = current.next_cursor() else {
            debug!(key = %self.key, "No next page");
            return Ok(false);
        };

        let page = (self.fetch_page)(cursor.clone()).await?;
        let mut next = (*current).clone();
        next.pages.push(page);
        next.page_params.push(cursor);
        debug!(key = %self.key, pages = next.len(), "Loaded next page");
        self.client.set_data(&self.key, next, self.options.policy);
        Ok(true)
    }

    /// Prepend the page before the first loaded one.
    ///
    /// # Errors
    ///
    /// The page fetch error; loaded pages are kept.
    pub async fn fetch_previous_page(&self) -> Result<bool, FetchError> {
        let Some(current) = self.data() else {
            return Ok(false);
        };
        let Some(cursor) = current.prev_cursor() else {
            return Ok(false);
        };

        let page = (self.fetch_page)(cursor.clone()).await?;
        let mut next = (*current).clone();
        next.pages.insert(0, page);
        next.page_params.insert(0, cursor);
        self.client.set_data(&self.key, next, self.options.policy);
        Ok(true)
    }

    /// Keep loading until `pages` pages are held or the upstream runs out.
    ///
    /// # Errors
    ///
    /// The first fetch error encountered.
    pub async fn load_pages(
        &self,
        initial: P::Cursor,
        pages: usize,
    ) -> Result<Arc<InfiniteData<P>>, FetchError> {
        let mut data = self.fetch(initial).await?;
        while data.len() < pages {
            if !self.fetch_next_page().await? {
                break;
            }
            match self.data() {
                Some(latest) => data = latest,
                None => break,
            }
        }
        Ok(data)
    }
}

async fn replay<P>(fetch_page: PageFetcher<P>, cursors: Vec<P::Cursor>) -> Result<InfiniteData<P>, FetchError>
where
    P: Paginated,
{
    let mut data = InfiniteData {
        pages: Vec::with_capacity(cursors.len()),
        page_params: Vec::with_capacity(cursors.len()),
    };
    for cursor in cursors {
        let page = fetch_page(cursor.clone()).await?;
        let has_next = page.next_cursor().is_some();
        data.pages.push(page);
        data.page_params.push(cursor);
        if !has_next {
            break;
        }
    }
    Ok(data)
}
