//! The result cache service.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use super::fingerprint::fingerprint;
use super::pruning::{prune_by_max_results, prune_by_ttl};
use super::tracker::{CachedQueryResult, TrackerCache};
use super::{CacheSettings, CacheStats, TrackerCacheResult};
use crate::indexer::{IndexerInfo, Release, TorznabQuery};
use crate::metrics::{CACHE_EVICTIONS, CACHE_LOOKUPS, CACHE_STORES};

/// Most releases a single indexer contributes to the recent-results view.
pub const RECENT_RESULTS_PER_TRACKER: usize = 300;

/// Most releases in the recent-results view overall.
pub const RECENT_RESULTS_TOTAL: usize = 3000;

#[derive(Debug, Default)]
struct StoreState {
    trackers: HashMap<String, TrackerCache>,
    /// Last creation stamp handed out; keeps stamps strictly increasing.
    last_created: Option<DateTime<Utc>>,
    /// Bumped on every full purge. Writes tagged with an older generation
    /// are dropped.
    generation: u64,
}

impl StoreState {
    fn next_created(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_created {
            if now <= last {
                now = last + chrono::Duration::nanoseconds(1);
            }
        }
        self.last_created = Some(now);
        now
    }

    fn purge(&mut self) {
        self.trackers.clear();
        self.generation += 1;
    }
}

/// In-memory cache of indexer results, partitioned by indexer.
///
/// Every public operation runs as one short critical section on a single
/// mutex and never blocks on I/O, so it can be called directly from async
/// request handlers. Settings are read on every call; when the cache is
/// disabled each operation is a no-op that also purges whatever was cached.
///
/// Nothing handed out aliases internal state: reads return owned copies and
/// writes clone the releases they are given.
pub struct CacheStore {
    settings: Arc<dyn CacheSettings>,
    state: Mutex<StoreState>,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("settings", &"<settings>")
            .field("state", &self.state)
            .finish()
    }
}

impl CacheStore {
    pub fn new(settings: Arc<dyn CacheSettings>) -> Self {
        Self {
            settings,
            state: Mutex::new(StoreState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads the live flag and purges everything when it is off.
    fn is_cache_enabled(&self, state: &mut StoreState) -> bool {
        if self.settings.cache_enabled() {
            return true;
        }
        if !state.trackers.is_empty() {
            info!(
                trackers = state.trackers.len(),
                "Result cache disabled, purging cached results"
            );
        }
        // Bumps the generation even when already empty.
        state.purge();
        false
    }

    fn prune_expired(&self, state: &mut StoreState) {
        let pruned = prune_by_ttl(&mut state.trackers, Utc::now(), self.settings.cache_ttl());
        if pruned > 0 {
            CACHE_EVICTIONS
                .with_label_values(&["ttl"])
                .inc_by(pruned as u64);
        }
    }

    /// Whether caching is currently on. Purges the cache when it is off.
    pub fn is_enabled(&self) -> bool {
        let mut state = self.lock();
        self.is_cache_enabled(&mut state)
    }

    /// Current purge generation.
    ///
    /// Capture it before a live fetch and pass it to
    /// [`cache_results_from`](Self::cache_results_from), so results fetched
    /// before a purge (e.g. under a proxy that has since been replaced) are
    /// not cached after it.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Store the releases a live query returned.
    ///
    /// Test queries are ignored. The releases are cloned, so the caller may
    /// keep using its list. Afterwards the indexer's oldest queries are
    /// evicted until it is back under its result cap.
    pub fn cache_results(&self, indexer: &IndexerInfo, query: &TorznabQuery, results: &[Release]) {
        self.store_results(None, indexer, query, results);
    }

    /// Like [`cache_results`](Self::cache_results), but only if the cache
    /// has not been purged since `generation` was read. Returns whether the
    /// results were stored.
    pub fn cache_results_from(
        &self,
        generation: u64,
        indexer: &IndexerInfo,
        query: &TorznabQuery,
        results: &[Release],
    ) -> bool {
        self.store_results(Some(generation), indexer, query, results)
    }

    fn store_results(
        &self,
        generation: Option<u64>,
        indexer: &IndexerInfo,
        query: &TorznabQuery,
        results: &[Release],
    ) -> bool {
        if query.is_test {
            return false;
        }

        let key = fingerprint(query);
        let results = results.to_vec();

        let mut state = self.lock();
        if !self.is_cache_enabled(&mut state) {
            return false;
        }
        if generation.is_some_and(|g| g != state.generation) {
            debug!(indexer = %indexer.id, "Cache purged during fetch, dropping results");
            return false;
        }

        let created = state.next_created();
        let tracker = state
            .trackers
            .entry(indexer.id.clone())
            .or_insert_with(|| TrackerCache::new(indexer));
        tracker.tracker_name.clone_from(&indexer.name);
        tracker.tracker_type.clone_from(&indexer.indexer_type);

        let count = results.len();
        if tracker
            .queries
            .insert(key.clone(), CachedQueryResult::new(created, results))
            .is_some()
        {
            debug!(indexer = %indexer.id, key = %key, "Replaced cached query");
        }
        CACHE_STORES.inc();
        debug!(indexer = %indexer.id, key = %key, results = count, "Cached query results");

        let pruned = prune_by_max_results(tracker, self.settings.cache_max_results_per_indexer());
        if pruned > 0 {
            CACHE_EVICTIONS
                .with_label_values(&["max_results"])
                .inc_by(pruned as u64);
        }
        true
    }

    /// Look up the cached releases for a query on an indexer.
    ///
    /// Expired entries are pruned first. Returns `None` when the cache is
    /// disabled, the indexer was never cached, or the query is not cached.
    pub fn search(&self, indexer: &IndexerInfo, query: &TorznabQuery) -> Option<Vec<Release>> {
        let key = fingerprint(query);

        let mut state = self.lock();
        if !self.is_cache_enabled(&mut state) {
            return None;
        }
        self.prune_expired(&mut state);

        let hit = state
            .trackers
            .get(&indexer.id)
            .and_then(|tracker| tracker.queries.get(&key))
            .map(|cached| cached.results.clone());

        match &hit {
            Some(results) => {
                CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
                debug!(indexer = %indexer.id, key = %key, results = results.len(), "Cache hit");
            }
            None => {
                CACHE_LOOKUPS.with_label_values(&["miss"]).inc();
                debug!(indexer = %indexer.id, key = %key, "Cache miss");
            }
        }
        hit
    }

    /// Most recent cached releases across every indexer.
    ///
    /// Within an indexer, queries are walked newest first and a release is
    /// reported once, with the creation time of the newest query that
    /// returned it as `first_seen`. Each indexer contributes at most
    /// [`RECENT_RESULTS_PER_TRACKER`] releases; the combined list is sorted by
    /// publish date, newest first, and capped at [`RECENT_RESULTS_TOTAL`].
    pub fn get_cached_results(&self) -> Vec<TrackerCacheResult> {
        let mut state = self.lock();
        if !self.is_cache_enabled(&mut state) {
            return Vec::new();
        }
        self.prune_expired(&mut state);

        let mut rows = Vec::new();
        for tracker in state.trackers.values() {
            let mut seen: HashSet<&str> = HashSet::new();
            let mut tracker_rows = Vec::new();

            'queries: for (_, query) in tracker.newest_first() {
                for release in &query.results {
                    if tracker_rows.len() >= RECENT_RESULTS_PER_TRACKER {
                        break 'queries;
                    }
                    if seen.insert(release.guid.as_str()) {
                        tracker_rows.push(TrackerCacheResult {
                            release: release.clone(),
                            first_seen: query.created,
                            tracker: tracker.tracker_name.clone(),
                            tracker_id: tracker.tracker_id.clone(),
                            tracker_type: tracker.tracker_type.clone(),
                        });
                    }
                }
            }
            rows.extend(tracker_rows);
        }
        drop(state);

        rows.sort_by(|a, b| b.release.publish_date.cmp(&a.release.publish_date));
        rows.truncate(RECENT_RESULTS_TOTAL);
        rows
    }

    /// Drop everything cached for one indexer. Returns whether it had a
    /// cache partition.
    pub fn clean_indexer_cache(&self, indexer_id: &str) -> bool {
        let mut state = self.lock();
        if !self.is_cache_enabled(&mut state) {
            return false;
        }

        let removed = state.trackers.remove(indexer_id).is_some();
        if removed {
            info!(indexer = %indexer_id, "Cleared indexer cache");
        }
        self.prune_expired(&mut state);
        removed
    }

    /// Drop everything cached.
    pub fn clean_cache(&self) {
        let mut state = self.lock();
        if !self.is_cache_enabled(&mut state) {
            return;
        }
        state.purge();
        info!("Cleared result cache");
    }

    /// Counts of what is currently cached (after pruning expired entries).
    pub fn stats(&self) -> CacheStats {
        let mut state = self.lock();
        if !self.is_cache_enabled(&mut state) {
            return CacheStats::default();
        }
        self.prune_expired(&mut state);

        let mut stats = CacheStats {
            enabled: true,
            trackers: state.trackers.len(),
            ..Default::default()
        };
        for query in state.trackers.values().flat_map(|t| t.queries.values()) {
            stats.queries += 1;
            stats.results += query.results.len();
            stats.oldest_entry = Some(match stats.oldest_entry {
                Some(oldest) => oldest.min(query.created),
                None => query.created,
            });
            stats.newest_entry = Some(match stats.newest_entry {
                Some(newest) => newest.max(query.created),
                None => query.created,
            });
        }
        stats
    }
}
