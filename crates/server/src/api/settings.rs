//! Runtime settings API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;
use trackercache_core::RuntimeSettings;

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// GET /api/v1/settings
pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<RuntimeSettings> {
    Json(state.settings().snapshot())
}

/// PUT /api/v1/settings
///
/// Replace the runtime settings. Cached results are dropped when the proxy
/// changes, since they may no longer be what the indexers return.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RuntimeSettings>,
) -> Result<Json<RuntimeSettings>, impl IntoResponse> {
    if let Err(e) = body.validate() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ));
    }

    let proxy_changed = state.settings().update(body);
    info!(proxy_changed, "Runtime settings updated");
    if proxy_changed {
        state.cache().clean_cache();
    }

    Ok(Json(state.settings().snapshot()))
}
