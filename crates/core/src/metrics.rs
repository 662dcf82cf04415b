//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - The result cache (lookups, stores, evictions)
//! - Live indexer requests

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Cache Metrics
// =============================================================================

/// Cache lookups by result.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trackercache_cache_lookups_total", "Total result cache lookups"),
        &["result"], // "hit", "miss"
    )
    .unwrap()
});

/// Query results written to the cache.
pub static CACHE_STORES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "trackercache_cache_stores_total",
        "Total query results written to the cache",
    )
    .unwrap()
});

/// Cached queries evicted, by reason.
pub static CACHE_EVICTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "trackercache_cache_evictions_total",
            "Total cached queries evicted",
        ),
        &["reason"], // "ttl", "max_results"
    )
    .unwrap()
});

// =============================================================================
// Indexer Metrics
// =============================================================================

/// Live indexer requests by indexer and outcome.
pub static INDEXER_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "trackercache_indexer_requests_total",
            "Total live indexer requests",
        ),
        &["indexer", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// Live indexer request duration in seconds.
pub static INDEXER_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "trackercache_indexer_request_duration_seconds",
            "Duration of live indexer requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["indexer"],
    )
    .unwrap()
});

/// Releases returned per live query.
pub static SEARCH_RESULTS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "trackercache_search_results",
            "Number of releases returned per live query",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 1000.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Cache
        Box::new(CACHE_LOOKUPS.clone()),
        Box::new(CACHE_STORES.clone()),
        Box::new(CACHE_EVICTIONS.clone()),
        // Indexers
        Box::new(INDEXER_REQUESTS.clone()),
        Box::new(INDEXER_REQUEST_DURATION.clone()),
        Box::new(SEARCH_RESULTS.clone()),
    ]
}
