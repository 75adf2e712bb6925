//! Keyed, type-erased query cache.
//!
//! Each entry remembers when it was last written and the policy it was
//! written with. An entry is stale once its stale window has passed or it was
//! invalidated; it becomes collectable once nothing observes it and its GC
//! window has passed since it went idle.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, warn};

use super::policy::QueryPolicy;
use crate::domain::query_key::{KeyPrefix, QueryKey};

/// Cached value with its concrete type erased.
pub type AnyValue = Arc<dyn Any + Send + Sync>;

#[derive(Clone)]
struct CacheEntry {
    value: Option<AnyValue>,
    updated_at: Option<DateTime<Utc>>,
    policy: QueryPolicy,
    invalidated: bool,
    observers: usize,
    /// When the last observer left (or the entry was written unobserved).
    idle_since: Option<DateTime<Utc>>,
}

impl CacheEntry {
    fn empty(policy: QueryPolicy) -> Self {
        Self {
            value: None,
            updated_at: None,
            policy,
            invalidated: false,
            observers: 0,
            idle_since: None,
        }
    }

    fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        match self.updated_at {
            Some(updated_at) => self.invalidated || now - updated_at >= self.policy.stale_time,
            None => true,
        }
    }

    fn is_collectable_at(&self, now: DateTime<Utc>) -> bool {
        if self.observers > 0 {
            return false;
        }
        match self.idle_since {
            Some(since) => now - since >= self.policy.gc_time,
            None => true,
        }
    }
}

/// A typed read from the cache.
#[derive(Debug)]
pub struct Cached<T> {
    pub value: Arc<T>,
    pub updated_at: DateTime<Utc>,
    pub is_stale: bool,
}

impl<T> Clone for Cached<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            updated_at: self.updated_at,
            is_stale: self.is_stale,
        }
    }
}

/// Thread-safe map from [`QueryKey`] to cached values.
///
/// Last write wins per key. Locks are never held across an await.
#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed lookup as of `now`.
    ///
    /// An entry holding a different type reads as a miss.
    #[must_use]
    pub fn get_at<T>(&self, key: &QueryKey, now: DateTime<Utc>) -> Option<Cached<T>>
    where
        T: Any + Send + Sync,
    {
        let (value, updated_at, is_stale) = {
            let entries = self.entries.read();
            let entry = entries.get(key)?;
            (
                entry.value.clone()?,
                entry.updated_at?,
                entry.is_stale_at(now),
            )
        };

        match value.downcast::<T>() {
            Ok(value) => Some(Cached {
                value,
                updated_at,
                is_stale,
            }),
            Err(_) => {
                warn!(key = %key, "Cached value has unexpected type");
                None
            }
        }
    }

    #[must_use]
    pub fn get<T>(&self, key: &QueryKey) -> Option<Cached<T>>
    where
        T: Any + Send + Sync,
    {
        self.get_at(key, Utc::now())
    }

    /// Store `value` as fresh as of `now`.
    pub fn insert_at(
        &self,
        key: QueryKey,
        value: AnyValue,
        policy: QueryPolicy,
        now: DateTime<Utc>,
    ) {
        let mut entries = self.entries.write();
        let entry = entries
            .entry(key)
            .or_insert_with(|| CacheEntry::empty(policy));
        entry.value = Some(value);
        entry.updated_at = Some(now);
        entry.policy = policy;
        entry.invalidated = false;
        if entry.observers == 0 {
            entry.idle_since = Some(now);
        }
    }

    pub fn insert(&self, key: QueryKey, value: AnyValue, policy: QueryPolicy) {
        self.insert_at(key, value, policy, Utc::now());
    }

    /// Whether `key` is missing or stale as of `now`.
    #[must_use]
    pub fn needs_fetch_at(&self, key: &QueryKey, now: DateTime<Utc>) -> bool {
        self.entries
            .read()
            .get(key)
            .map_or(true, |entry| entry.value.is_none() || entry.is_stale_at(now))
    }

    /// Mark one entry stale. Returns whether it held data.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        match self.entries.write().get_mut(key) {
            Some(entry) if entry.value.is_some() => {
                entry.invalidated = true;
                true
            }
            _ => false,
        }
    }

    /// Mark every entry under `prefix` stale. Returns how many were marked.
    pub fn invalidate_prefix(&self, prefix: &KeyPrefix) -> usize {
        let mut entries = self.entries.write();
        let mut marked = 0;
        for (key, entry) in entries.iter_mut() {
            if entry.value.is_some() && key.matches(prefix) {
                entry.invalidated = true;
                marked += 1;
            }
        }
        debug!(prefix = ?prefix, marked, "Invalidated cache entries");
        marked
    }

    /// Drop one entry regardless of observers.
    pub fn remove(&self, key: &QueryKey) -> bool {
        self.entries.write().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Pin `key` against garbage collection until the guard drops.
    #[must_use]
    pub fn observe(self: &Arc<Self>, key: QueryKey) -> QueryObserver {
        {
            let mut entries = self.entries.write();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| CacheEntry::empty(QueryPolicy::default()));
            entry.observers += 1;
            entry.idle_since = None;
        }
        QueryObserver {
            cache: Arc::clone(self),
            key,
        }
    }

    #[must_use]
    pub fn observer_count(&self, key: &QueryKey) -> usize {
        self.entries.read().get(key).map_or(0, |entry| entry.observers)
    }

    fn release_at(&self, key: &QueryKey, now: DateTime<Utc>) {
        if let Some(entry) = self.entries.write().get_mut(key) {
            entry.observers = entry.observers.saturating_sub(1);
            if entry.observers == 0 {
                entry.idle_since = Some(now);
            }
        }
    }

    /// Evict unobserved entries whose GC window has elapsed as of `now`.
    /// Returns how many were evicted.
    pub fn collect_garbage_at(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_collectable_at(now));
        before - entries.len()
    }
}

/// Keeps a cache entry alive while held.
pub struct QueryObserver {
    cache: Arc<QueryCache>,
    key: QueryKey,
}

impl QueryObserver {
    #[must_use]
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

impl Drop for QueryObserver {
    fn drop(&mut self) {
        self.cache.release_at(&self.key, Utc::now());
    }
}
