//! Freshness and retention windows per resource family.

use chrono::Duration;

/// Longest stale or GC window; larger values are clamped.
pub const MAX_WINDOW_SECS: u64 = 365 * 24 * 60 * 60;

/// How long an entry stays fresh, and how long an unobserved entry is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    pub stale_time: Duration,
    pub gc_time: Duration,
}

impl QueryPolicy {
    #[must_use]
    pub const fn new(stale_time: Duration, gc_time: Duration) -> Self {
        Self {
            stale_time,
            gc_time,
        }
    }

    #[must_use]
    pub fn from_secs(stale_secs: u64, gc_secs: u64) -> Self {
        Self::new(window(stale_secs), window(gc_secs))
    }

    /// Always stale; every read revalidates.
    #[must_use]
    pub fn always_stale(gc_time: Duration) -> Self {
        Self::new(Duration::zero(), gc_time)
    }
}

fn window(secs: u64) -> Duration {
    i64::try_from(secs.min(MAX_WINDOW_SECS)).map_or(Duration::zero(), Duration::seconds)
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self::from_secs(300, 600)
    }
}

/// Per-call options for [`super::client::QueryClient::fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub policy: QueryPolicy,
    /// Refresh stale hits in the background instead of only serving them.
    pub revalidate_stale: bool,
}

impl QueryOptions {
    #[must_use]
    pub const fn new(policy: QueryPolicy) -> Self {
        Self {
            policy,
            revalidate_stale: true,
        }
    }

    #[must_use]
    pub const fn without_revalidation(mut self) -> Self {
        self.revalidate_stale = false;
        self
    }
}

impl From<QueryPolicy> for QueryOptions {
    fn from(policy: QueryPolicy) -> Self {
        Self::new(policy)
    }
}

/// Policy presets keyed by query-key domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPolicies {
    pub default: QueryPolicy,
    pub apod: QueryPolicy,
    pub characters: QueryPolicy,
    pub gifs: QueryPolicy,
}

impl QueryPolicies {
    /// Policy for a key domain (`nasa`, `rickandmorty`, `giphy`); anything
    /// else gets the default.
    #[must_use]
    pub fn for_domain(&self, domain: &str) -> QueryPolicy {
        match domain {
            "nasa" => self.apod,
            "rickandmorty" => self.characters,
            "giphy" => self.gifs,
            _ => self.default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_lookup_falls_back_to_default() {
        let policies = QueryPolicies {
            default: QueryPolicy::from_secs(1, 2),
            apod: QueryPolicy::from_secs(3600, 86400),
            characters: QueryPolicy::from_secs(600, 1800),
            gifs: QueryPolicy::from_secs(60, 300),
        };
        assert_eq!(policies.for_domain("nasa").stale_time, Duration::hours(1));
        assert_eq!(policies.for_domain("giphy").gc_time, Duration::minutes(5));
        assert_eq!(policies.for_domain("catalog"), QueryPolicy::from_secs(1, 2));
    }

    #[test]
    fn oversized_windows_are_clamped() {
        let policy = QueryPolicy::from_secs(10_000_000_000_000_000, u64::MAX);
        let ceiling = Duration::seconds(365 * 24 * 60 * 60);
        assert_eq!(policy.stale_time, ceiling);
        assert_eq!(policy.gc_time, ceiling);
    }

    #[test]
    fn options_default_to_revalidation() {
        let options = QueryOptions::from(QueryPolicy::default());
        assert!(options.revalidate_stale);
        assert!(!options.without_revalidation().revalidate_stale);
    }
}
