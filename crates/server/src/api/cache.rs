//! Result cache API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use trackercache_core::{CacheStats, TrackerCacheResult};

use super::handlers::{ErrorResponse, SuccessResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CacheListResponse {
    pub results: Vec<TrackerCacheResult>,
    pub total: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/cache
///
/// Most recent cached releases across all indexers.
pub async fn list_cache(State(state): State<Arc<AppState>>) -> Json<CacheListResponse> {
    let results = state.cache().get_cached_results();
    let total = results.len();
    Json(CacheListResponse { results, total })
}

/// GET /api/v1/cache/stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.cache().stats())
}

/// DELETE /api/v1/cache
///
/// Drop every cached result.
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<SuccessResponse> {
    state.cache().clean_cache();
    Json(SuccessResponse {
        message: "Cache cleared".to_string(),
    })
}

/// DELETE /api/v1/cache/{indexer_id}
///
/// Drop the cached results of one indexer.
pub async fn clear_indexer_cache(
    State(state): State<Arc<AppState>>,
    Path(indexer_id): Path<String>,
) -> Result<Json<SuccessResponse>, impl IntoResponse> {
    if state.service().indexer(&indexer_id).is_none() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Indexer not found: {}", indexer_id),
            }),
        ));
    }

    state.cache().clean_indexer_cache(&indexer_id);
    Ok(Json(SuccessResponse {
        message: format!("Cleared cache for {}", indexer_id),
    }))
}
