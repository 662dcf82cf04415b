//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the trackercache server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Result cache contents (collected dynamically)
//!
//! Core metrics (cache lookups, evictions, indexer requests) are registered
//! alongside.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use regex_lite::Regex;
use tracing::error;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "trackercache_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trackercache_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "trackercache_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Cache Metrics (collected dynamically)
// =============================================================================

/// Whether the result cache is enabled (1) or disabled (0).
pub static CACHE_ENABLED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "trackercache_cache_enabled",
        "Whether the result cache is enabled (1) or disabled (0)",
    )
    .unwrap()
});

/// Indexers with a cache partition.
pub static CACHE_TRACKERS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "trackercache_cache_trackers",
        "Number of indexers with cached results",
    )
    .unwrap()
});

/// Cached queries.
pub static CACHE_QUERIES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("trackercache_cache_queries", "Number of cached queries").unwrap()
});

/// Cached releases.
pub static CACHE_RESULTS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "trackercache_cache_results",
        "Number of cached releases across all queries",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Cache
    registry.register(Box::new(CACHE_ENABLED.clone())).unwrap();
    registry.register(Box::new(CACHE_TRACKERS.clone())).unwrap();
    registry.register(Box::new(CACHE_QUERIES.clone())).unwrap();
    registry.register(Box::new(CACHE_RESULTS.clone())).unwrap();

    // Core metrics (cache operations, indexer requests)
    for metric in trackercache_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
///
/// This is called before encoding metrics to update the cache gauges.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let stats = state.cache().stats();
    CACHE_ENABLED.set(if stats.enabled { 1 } else { 0 });
    CACHE_TRACKERS.set(stats.trackers as i64);
    CACHE_QUERIES.set(stats.queries as i64);
    CACHE_RESULTS.set(stats.results as i64);
}

static CACHE_ENTRY_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/api/v1/cache/[^/]+$").unwrap());
static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    if path != "/api/v1/cache/stats" && CACHE_ENTRY_PATH.is_match(path) {
        return "/api/v1/cache/{indexer_id}".to_string();
    }
    NUMERIC_SEGMENT.replace_all(path, "/{id}$1").to_string()
}
