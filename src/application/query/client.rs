//! Query client: cache reads, de-duplicated fetches and background
//! revalidation.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::cache::{AnyValue, QueryCache, QueryObserver};
use super::policy::{QueryOptions, QueryPolicy};
use crate::domain::query_key::{KeyPrefix, QueryKey};
use crate::error::FetchError;

type SharedFetch = Shared<BoxFuture<'static, Result<AnyValue, FetchError>>>;

/// Cheap to clone; clones share the cache and the in-flight table.
#[derive(Clone, Default)]
pub struct QueryClient {
    cache: Arc<QueryCache>,
    in_flight: Arc<Mutex<HashMap<QueryKey, SharedFetch>>>,
}

impl QueryClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cache(cache: Arc<QueryCache>) -> Self {
        Self {
            cache,
            in_flight: Arc::default(),
        }
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Read through the cache.
    ///
    /// A fresh hit is returned as-is. A stale hit is returned immediately
    /// and, unless disabled in `options`, refreshed in the background. A miss
    /// runs `fetcher` (or joins a fetch already in flight for `key`).
    ///
    /// # Errors
    ///
    /// The fetcher's error on a miss. Failed fetches are not cached.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: &QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<Arc<T>, FetchError>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        if let Some(cached) = self.cache.get::<T>(key) {
            if !cached.is_stale {
                debug!(key = %key, "Query cache hit");
                return Ok(cached.value);
            }
            if options.revalidate_stale {
                debug!(key = %key, "Serving stale data, revalidating");
                let pending = self.start_fetch(key, options.policy, fetcher);
                tokio::spawn(async move {
                    let _ = pending.await;
                });
            }
            return Ok(cached.value);
        }

        debug!(key = %key, "Query cache miss");
        let pending = self.start_fetch(key, options.policy, fetcher);
        downcast(key, pending.await?)
    }

    /// Fetch regardless of what the cache holds.
    ///
    /// # Errors
    ///
    /// The fetcher's error. The previous cached value is kept.
    pub async fn refetch<T, F, Fut>(
        &self,
        key: &QueryKey,
        policy: QueryPolicy,
        fetcher: F,
    ) -> Result<Arc<T>, FetchError>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let pending = self.start_fetch(key, policy, fetcher);
        downcast(key, pending.await?)
    }

    /// Warm the cache for `key` if it is missing or stale.
    ///
    /// Failures are logged and swallowed. Returns whether new data landed.
    pub async fn prefetch<T, F, Fut>(&self, key: &QueryKey, policy: QueryPolicy, fetcher: F) -> bool
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        if !self.cache.needs_fetch_at(key, Utc::now()) {
            return false;
        }
        match self.start_fetch(key, policy, fetcher).await {
            Ok(_) => true,
            Err(err) => {
                warn!(key = %key, error = %err, "Prefetch failed");
                false
            }
        }
    }

    /// Run `fetcher` for `key` unless a fetch for it is already in flight,
    /// in which case the existing one is shared.
    fn start_fetch<T, F, Fut>(&self, key: &QueryKey, policy: QueryPolicy, fetcher: F) -> SharedFetch
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let mut in_flight = self.in_flight.lock();
        if let Some(existing) = in_flight.get(key) {
            debug!(key = %key, "Joining in-flight query");
            return existing.clone();
        }

        let cache = Arc::clone(&self.cache);
        let registry = Arc::clone(&self.in_flight);
        let owned_key = key.clone();
        let pending = async move {
            let result = fetcher().await.map(|value| Arc::new(value) as AnyValue);
            match &result {
                Ok(value) => cache.insert(owned_key.clone(), Arc::clone(value), policy),
                Err(err) => debug!(key = %owned_key, error = %err, "Query failed"),
            }
            registry.lock().remove(&owned_key);
            result
        }
        .boxed()
        .shared();

        in_flight.insert(key.clone(), pending.clone());
        pending
    }

    #[must_use]
    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.in_flight.lock().contains_key(key)
    }

    pub fn invalidate(&self, key: &QueryKey) -> bool {
        self.cache.invalidate(key)
    }

    pub fn invalidate_prefix(&self, prefix: &KeyPrefix) -> usize {
        self.cache.invalidate_prefix(prefix)
    }

    /// Write a value directly, as if it had just been fetched.
    pub fn set_data<T>(&self, key: &QueryKey, value: T, policy: QueryPolicy)
    where
        T: Any + Send + Sync,
    {
        self.cache.insert(key.clone(), Arc::new(value), policy);
    }

    #[must_use]
    pub fn get_data<T>(&self, key: &QueryKey) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.cache.get::<T>(key).map(|cached| cached.value)
    }

    pub fn remove(&self, key: &QueryKey) -> bool {
        self.cache.remove(key)
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    #[must_use]
    pub fn observe(&self, key: QueryKey) -> QueryObserver {
        self.cache.observe(key)
    }

    pub fn collect_garbage(&self) -> usize {
        self.cache.collect_garbage_at(Utc::now())
    }

    /// Sweep the cache every `interval` until the handle is aborted.
    pub fn spawn_gc(&self, interval: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(&self.cache);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = cache.collect_garbage_at(Utc::now());
                if evicted > 0 {
                    debug!(evicted, remaining = cache.len(), "Query cache GC");
                }
            }
        })
    }
}

fn downcast<T>(key: &QueryKey, value: AnyValue) -> Result<Arc<T>, FetchError>
where
    T: Any + Send + Sync,
{
    value
        .downcast::<T>()
        .map_err(|_| FetchError::decode(format!("query {key} resolved to an unexpected type")))
}
