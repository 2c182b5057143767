//! `/tags` WebSocket push channel.
//!
//! Every text frame is one JSON tag batch. A new client first receives the
//! full snapshot, then the merged records of each change as it happens.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tail_common::TagBatch;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::state::{AppState, SharedState};

pub async fn tags_ws(ws: WebSocketUpgrade, State(state): State<SharedState>) -> Response {
    ws.on_upgrade(move |socket| push_tags(socket, state))
}

fn encode(batch: &TagBatch) -> Option<Message> {
    match serde_json::to_string(batch) {
        Ok(text) => Some(Message::Text(text.into())),
        Err(e) => {
            warn!("Failed to encode tag batch: {}", e);
            None
        }
    }
}

/// Batch to push for one broadcast result. A receiver that fell behind
/// gets the full snapshot in place of the batches it missed; `None` means
/// the channel closed.
async fn catch_up(
    update: Result<TagBatch, RecvError>,
    state: &AppState,
    client: Uuid,
) -> Option<TagBatch> {
    match update {
        Ok(batch) => Some(batch),
        Err(RecvError::Lagged(missed)) => {
            warn!(%client, missed, "Tag client lagged, resending snapshot");
            Some(state.snapshot().await)
        }
        Err(RecvError::Closed) => None,
    }
}

async fn push_tags(socket: WebSocket, state: SharedState) {
    let client = Uuid::new_v4();
    // subscribe before the snapshot so nothing falls in between
    let mut rx = state.subscribe();
    let (mut sender, mut receiver) = socket.split();
    info!(%client, clients = state.client_connected(), "Tag client connected");

    let mut pending = encode(&state.snapshot().await);
    loop {
        if let Some(msg) = pending.take() {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
        tokio::select! {
            update = rx.recv() => match catch_up(update, &state, client).await {
                Some(batch) => pending = encode(&batch),
                None => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(other)) => debug!(%client, "Ignoring client frame: {:?}", other),
            },
        }
    }

    info!(%client, clients = state.client_disconnected(), "Tag client disconnected");
}
