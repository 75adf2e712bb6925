//! Query cache policy configuration.

use std::time::Duration;

use serde::Deserialize;

/// Freshness and retention windows for one family of queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CachePolicyConfig {
    /// Seconds a value stays fresh.
    pub stale_secs: u64,
    /// Seconds an unobserved value is retained.
    pub gc_secs: u64,
}

impl CachePolicyConfig {
    #[must_use]
    pub const fn new(stale_secs: u64, gc_secs: u64) -> Self {
        Self {
            stale_secs,
            gc_secs,
        }
    }

    #[must_use]
    pub const fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_secs)
    }

    #[must_use]
    pub const fn gc_time(&self) -> Duration {
        Duration::from_secs(self.gc_secs)
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_policy")]
    pub default: CachePolicyConfig,
    /// APOD entries never change once published.
    #[serde(default = "default_apod_policy")]
    pub apod: CachePolicyConfig,
    #[serde(default = "default_characters_policy")]
    pub characters: CachePolicyConfig,
    /// Trending changes quickly.
    #[serde(default = "default_gifs_policy")]
    pub gifs: CachePolicyConfig,
    /// Seconds between garbage-collection sweeps.
    #[serde(default = "default_gc_interval_secs")]
    pub gc_interval_secs: u64,
}

const fn default_policy() -> CachePolicyConfig {
    CachePolicyConfig::new(300, 600)
}

const fn default_apod_policy() -> CachePolicyConfig {
    CachePolicyConfig::new(3600, 86_400)
}

const fn default_characters_policy() -> CachePolicyConfig {
    CachePolicyConfig::new(600, 1800)
}

const fn default_gifs_policy() -> CachePolicyConfig {
    CachePolicyConfig::new(60, 300)
}

const fn default_gc_interval_secs() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default: default_policy(),
            apod: default_apod_policy(),
            characters: default_characters_policy(),
            gifs: default_gifs_policy(),
            gc_interval_secs: default_gc_interval_secs(),
        }
    }
}

impl CacheConfig {
    /// Every named policy, for validation and display.
    #[must_use]
    pub fn policies(&self) -> [(&'static str, CachePolicyConfig); 4] {
        [
            ("cache.default", self.default),
            ("cache.apod", self.apod),
            ("cache.characters", self.characters),
            ("cache.gifs", self.gifs),
        ]
    }
}
