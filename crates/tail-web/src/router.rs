//! Axum router — maps all URL paths to handlers.

use axum::{
    Router,
    routing::get,
};
use tower_http::{
    services::ServeDir,
    cors::CorsLayer,
    trace::TraceLayer,
    compression::CompressionLayer,
};
use crate::state::SharedState;
use crate::handlers::{
    api::{api_status, api_tags},
    pages::{index, list_page, map_page},
};
use crate::sse::sse_handler;
use crate::ws::tags_ws;

/// Build and return the full Axum router.
pub fn build_router(shared: SharedState) -> Router {
    let static_dir = shared.static_dir.clone();

    Router::new()
        // Pages
        .route("/",     get(index))
        .route("/map",  get(map_page))
        .route("/list", get(list_page))

        // Push channel
        .route("/tags", get(tags_ws))
        .route("/api/events", get(sse_handler))

        // API endpoints
        .route("/api/tags",   get(api_tags))
        .route("/api/status", get(api_status))

        // Static files
        .nest_service("/static", ServeDir::new(static_dir))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
