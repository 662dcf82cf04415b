//! Search API handler.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use trackercache_core::{AggregateResult, IndexerError, TorznabQuery};

use super::handlers::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(flatten)]
    pub query: TorznabQuery,
    /// Restrict the search to these indexer ids.
    #[serde(default)]
    pub indexers: Option<Vec<String>>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/search
///
/// Run a query on the selected indexers, answering from the cache where
/// possible.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<AggregateResult>, impl IntoResponse> {
    match state
        .service()
        .search(&body.query, body.indexers.as_deref())
        .await
    {
        Ok(result) => Ok(Json(result)),
        Err(IndexerError::NotFound(id)) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Indexer not found: {}", id),
            }),
        )),
        Err(IndexerError::AllFailed(errors)) => {
            let mut details: Vec<String> = errors
                .iter()
                .map(|(id, error)| format!("{}: {}", id, error))
                .collect();
            details.sort();
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("All indexers failed ({})", details.join("; ")),
                }),
            ))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
