//! Server-Sent Events mirror of the `/tags` push channel.

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::extract::State;
use futures_core::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::state::SharedState;

/// SSE endpoint: the current snapshot, then every merged change.
/// Lagged updates are dropped; clients re-sync from /api/tags.
pub async fn sse_handler(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();
    let snapshot = state.snapshot().await;

    let initial = tokio_stream::once(snapshot);
    let updates = BroadcastStream::new(rx).filter_map(|result| result.ok());
    let stream = initial.chain(updates).filter_map(|batch| {
        serde_json::to_string(&batch).ok().map(|data| {
            Ok(Event::default().event("tags").data(data))
        })
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
