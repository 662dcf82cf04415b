//! Views produced by the cache store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::indexer::Release;

/// A cached release annotated with where and when it was first seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerCacheResult {
    #[serde(flatten)]
    pub release: Release,
    /// Creation time of the newest cached query that returned this release.
    pub first_seen: DateTime<Utc>,
    /// Indexer display name.
    pub tracker: String,
    pub tracker_id: String,
    pub tracker_type: String,
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub enabled: bool,
    /// Indexers with a cache partition (possibly empty).
    pub trackers: usize,
    /// Cached queries across all indexers.
    pub queries: usize,
    /// Cached releases across all queries.
    pub results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_entry: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_entry: Option<DateTime<Utc>>,
}
