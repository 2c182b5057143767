//! JSON endpoints.

use axum::{extract::State, Json};
use serde::Serialize;
use tail_common::TagBatch;

use crate::state::{FeedStatus, SharedState};

#[derive(Debug, Serialize)]
pub struct ApiStatus {
    pub feed: FeedStatus,
    pub tags: usize,
    pub clients: usize,
}

/// GET /api/tags - every tag as a full record, in first-seen order
pub async fn api_tags(State(state): State<SharedState>) -> Json<TagBatch> {
    Json(state.snapshot().await)
}

/// GET /api/status - feed health and counters
pub async fn api_status(State(state): State<SharedState>) -> Json<ApiStatus> {
    let tags = state.tags.read().await.len();
    Json(ApiStatus {
        feed: state.status().await,
        tags,
        clients: state.client_count(),
    })
}
