//! In-memory result cache.
//!
//! Results are partitioned per indexer and keyed by a fingerprint of the
//! query. Entries expire after a configurable TTL and each indexer is held
//! under a cap on the number of cached releases, evicting whole queries
//! oldest first.
//!
//! The cache is not persisted; a restart starts empty.

mod fingerprint;
mod pruning;
mod store;
mod tracker;
mod types;

use std::time::Duration;

pub use fingerprint::fingerprint;
pub use store::{CacheStore, RECENT_RESULTS_PER_TRACKER, RECENT_RESULTS_TOTAL};
pub use tracker::{CachedQueryResult, TrackerCache};
pub use types::{CacheStats, TrackerCacheResult};

/// Source of the cache's tunables.
///
/// Read on every cache operation so runtime changes apply immediately.
pub trait CacheSettings: Send + Sync {
    fn cache_enabled(&self) -> bool;

    /// How long a cached query stays valid.
    fn cache_ttl(&self) -> Duration;

    /// Upper bound on cached releases per indexer.
    fn cache_max_results_per_indexer(&self) -> usize;
}
