use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{cache, handlers, indexers, middleware::metrics_middleware, search, settings};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Indexers and search
        .route("/indexers", get(indexers::list_indexers))
        .route("/search", post(search::search))
        // Result cache
        .route("/cache", get(cache::list_cache).delete(cache::clear_cache))
        .route("/cache/stats", get(cache::get_stats))
        .route("/cache/{indexer_id}", delete(cache::clear_indexer_cache))
        // Runtime settings
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .with_state(state.clone());

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer((
            TraceLayer::new_for_http(),
            CorsLayer::permissive(),
            middleware::from_fn(metrics_middleware),
        ))
}
