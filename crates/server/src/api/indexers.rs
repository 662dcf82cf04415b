//! Indexer listing.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use trackercache_core::IndexerInfo;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct IndexersResponse {
    pub indexers: Vec<IndexerInfo>,
}

/// GET /api/v1/indexers
pub async fn list_indexers(State(state): State<Arc<AppState>>) -> Json<IndexersResponse> {
    Json(IndexersResponse {
        indexers: state.indexers(),
    })
}
