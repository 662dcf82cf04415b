//! Eviction strategies applied by the cache store.
//!
//! Both work on whole cached queries: a query's release list is never
//! truncated, so a cache hit always returns a complete response.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::tracker::TrackerCache;

/// Remove every cached query created before `now - ttl`, across all trackers.
///
/// Emptied trackers are kept. Returns the number of queries removed.
pub fn prune_by_ttl(
    trackers: &mut HashMap<String, TrackerCache>,
    now: DateTime<Utc>,
    ttl: Duration,
) -> usize {
    // A TTL too large to represent never expires anything.
    let Some(cutoff) = chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_sub_signed(ttl))
    else {
        return 0;
    };

    let mut pruned = 0;
    for tracker in trackers.values_mut() {
        let before = tracker.queries.len();
        tracker.queries.retain(|_, query| query.created >= cutoff);
        pruned += before - tracker.queries.len();
    }

    if pruned > 0 {
        debug!(pruned, cutoff = %cutoff, "Pruned expired cache entries");
    }
    pruned
}

/// Evict the oldest queries of one tracker until its total release count is
/// at most `max_results`.
///
/// If the newest query alone exceeds the cap it is evicted too. Returns the
/// number of queries removed.
pub fn prune_by_max_results(tracker: &mut TrackerCache, max_results: usize) -> usize {
    let mut per_query: Vec<(String, usize)> = tracker
        .newest_first()
        .into_iter()
        .map(|(key, query)| (key.clone(), query.results.len()))
        .collect();
    let mut total: usize = per_query.iter().map(|(_, count)| count).sum();

    let mut pruned = 0;
    while total > max_results {
        let Some((oldest, count)) = per_query.pop() else {
            break;
        };
        tracker.queries.remove(&oldest);
        total -= count;
        pruned += 1;
    }

    if pruned > 0 {
        debug!(
            indexer = %tracker.tracker_id,
            pruned,
            remaining_results = total,
            max_results,
            "Pruned cache entries over per-indexer limit"
        );
    }
    pruned
}
