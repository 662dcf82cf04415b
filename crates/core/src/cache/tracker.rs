//! Per-indexer containers held by the cache store.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::indexer::{IndexerInfo, Release};

/// Releases returned by one query, stamped with when they were cached.
#[derive(Debug, Clone)]
pub struct CachedQueryResult {
    pub created: DateTime<Utc>,
    pub results: Vec<Release>,
}

impl CachedQueryResult {
    pub fn new(created: DateTime<Utc>, results: Vec<Release>) -> Self {
        Self { created, results }
    }
}

/// All cached queries of a single indexer.
///
/// The name and type are reporting metadata only; the store is keyed by
/// `tracker_id`.
#[derive(Debug, Clone)]
pub struct TrackerCache {
    pub tracker_id: String,
    pub tracker_name: String,
    pub tracker_type: String,
    /// Fingerprint -> cached result.
    pub queries: HashMap<String, CachedQueryResult>,
}

impl TrackerCache {
    pub fn new(indexer: &IndexerInfo) -> Self {
        Self {
            tracker_id: indexer.id.clone(),
            tracker_name: indexer.name.clone(),
            tracker_type: indexer.indexer_type.clone(),
            queries: HashMap::new(),
        }
    }

    /// Total releases across every cached query.
    pub fn result_count(&self) -> usize {
        self.queries.values().map(|q| q.results.len()).sum()
    }

    /// Fingerprints and queries, newest first.
    pub fn newest_first(&self) -> Vec<(&String, &CachedQueryResult)> {
        let mut queries: Vec<_> = self.queries.iter().collect();
        queries.sort_by(|a, b| b.1.created.cmp(&a.1.created));
        queries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn releases(n: usize) -> Vec<Release> {
        (0..n)
            .map(|i| Release::new(format!("g{}", i), format!("Release {}", i), Utc::now()))
            .collect()
    }

    #[test]
    fn test_new_copies_indexer_metadata() {
        let tracker = TrackerCache::new(&IndexerInfo::new("abc", "ABC Tracker", "private"));
        assert_eq!(tracker.tracker_id, "abc");
        assert_eq!(tracker.tracker_name, "ABC Tracker");
        assert_eq!(tracker.tracker_type, "private");
        assert!(tracker.queries.is_empty());
    }

    #[test]
    fn test_result_count_sums_queries() {
        let mut tracker = TrackerCache::new(&IndexerInfo::new("abc", "ABC", "public"));
        tracker
            .queries
            .insert("a".to_string(), CachedQueryResult::new(Utc::now(), releases(3)));
        tracker
            .queries
            .insert("b".to_string(), CachedQueryResult::new(Utc::now(), releases(4)));
        assert_eq!(tracker.result_count(), 7);
    }

    #[test]
    fn test_newest_first_orders_by_created() {
        let now = Utc::now();
        let mut tracker = TrackerCache::new(&IndexerInfo::new("abc", "ABC", "public"));
        tracker.queries.insert(
            "old".to_string(),
            CachedQueryResult::new(now - Duration::minutes(10), vec![]),
        );
        tracker
            .queries
            .insert("new".to_string(), CachedQueryResult::new(now, vec![]));
        tracker.queries.insert(
            "mid".to_string(),
            CachedQueryResult::new(now - Duration::minutes(5), vec![]),
        );

        let keys: Vec<&str> = tracker
            .newest_first()
            .into_iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, vec!["new", "mid", "old"]);
    }
}
