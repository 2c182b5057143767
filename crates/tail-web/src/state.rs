//! Shared application state for the web server.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tail_common::{Floorplan, MergeMode, TagBatch, TagMap};
use tail_feed::FeedEvent;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

use crate::config::{Config, MapConfig};
use crate::templates::Templates;

/// Health of the upstream tag feed, as reported on /api/status.
#[derive(Debug, Clone, Serialize)]
pub struct FeedStatus {
    pub source: String,
    pub connected: bool,
    pub batches: u64,
    pub last_batch_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Shared state injected into every Axum handler.
pub struct AppState {
    /// Presentation cache of every tag seen this session.
    pub tags: RwLock<TagMap>,
    pub merge: MergeMode,
    pub map: MapConfig,
    pub floorplan: Floorplan,
    pub static_dir: PathBuf,
    pub templates: Templates,
    /// Broadcast channel for merged tag records
    pub event_tx: broadcast::Sender<TagBatch>,
    status: RwLock<FeedStatus>,
    clients: AtomicUsize,
}

/// Batches a push client may fall behind before it is resynchronised.
pub const EVENT_CAPACITY: usize = 256;

impl AppState {
    pub fn new(config: &Config, source: &str) -> Self {
        Self::with_capacity(config, source, EVENT_CAPACITY)
    }

    pub fn with_capacity(config: &Config, source: &str, capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity);
        Self {
            tags: RwLock::new(TagMap::new()),
            merge: config.tags.merge,
            map: config.map.clone(),
            floorplan: config.map.floorplan(),
            static_dir: config.server.static_dir.clone(),
            templates: Templates::new(),
            event_tx,
            status: RwLock::new(FeedStatus {
                source: source.to_string(),
                connected: false,
                batches: 0,
                last_batch_at: None,
                last_error: None,
            }),
            clients: AtomicUsize::new(0),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TagBatch> {
        self.event_tx.subscribe()
    }

    /// Merge a batch and push the changed records to every subscriber.
    /// Returns the number of tags that changed.
    ///
    /// The write lock is held while broadcasting, so a client that subscribes
    /// before taking a snapshot never misses a change.
    pub async fn apply_batch(&self, batch: &TagBatch) -> usize {
        let mut tags = self.tags.write().await;
        let changed = tags.apply(batch, self.merge);
        if !changed.is_empty() {
            // no subscribers is fine
            let _ = self.event_tx.send(tags.batch_for(&changed));
        }
        changed.len()
    }

    pub async fn snapshot(&self) -> TagBatch {
        self.tags.read().await.snapshot()
    }

    pub async fn handle_event(&self, event: FeedEvent) {
        match event {
            FeedEvent::Connected => {
                let mut status = self.status.write().await;
                status.connected = true;
                status.last_error = None;
                info!("Tag feed '{}' connected", status.source);
            }
            FeedEvent::Disconnected { reason } => {
                let mut status = self.status.write().await;
                status.connected = false;
                status.last_error = Some(reason);
            }
            FeedEvent::Batch(batch) => {
                let changed = self.apply_batch(&batch).await;
                let mut status = self.status.write().await;
                status.batches += 1;
                status.last_batch_at = Some(Utc::now());
                debug!("Merged batch of {} tags ({} changed)", batch.len(), changed);
            }
        }
    }

    pub async fn status(&self) -> FeedStatus {
        self.status.read().await.clone()
    }

    pub fn client_connected(&self) -> usize {
        self.clients.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn client_disconnected(&self) -> usize {
        self.clients.fetch_sub(1, Ordering::Relaxed).saturating_sub(1)
    }

    pub fn client_count(&self) -> usize {
        self.clients.load(Ordering::Relaxed)
    }
}

pub type SharedState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;
    use tail_common::TagPatch;

    fn batch(id: &str, patch: TagPatch) -> TagBatch {
        TagBatch::from([(id.to_string(), patch)])
    }

    #[tokio::test]
    async fn test_apply_batch_broadcasts_merged_records() {
        let state = AppState::new(&Config::default(), "test");
        let mut rx = state.subscribe();

        state.apply_batch(&batch("a", TagPatch::position(1.0, 1.0).with_name("Alpha"))).await;
        state.apply_batch(&batch("a", TagPatch::position(2.0, 3.0))).await;

        let first = rx.recv().await.unwrap();
        assert_eq!(first["a"].name.as_deref(), Some("Alpha"));
        let second = rx.recv().await.unwrap();
        // field merge: the delta carries the full record, name included
        assert_eq!(second["a"].name.as_deref(), Some("Alpha"));
        assert_eq!((second["a"].x, second["a"].y), (Some(2.0), Some(3.0)));
    }

    #[tokio::test]
    async fn test_unchanged_batch_is_not_broadcast() {
        let state = AppState::new(&Config::default(), "test");
        state.apply_batch(&batch("a", TagPatch::position(1.0, 1.0))).await;
        let mut rx = state.subscribe();

        assert_eq!(state.apply_batch(&batch("a", TagPatch::position(1.0, 1.0))).await, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_feed_events_update_status() {
        let state = AppState::new(&Config::default(), "rtls");
        state.handle_event(FeedEvent::Connected).await;
        state.handle_event(FeedEvent::Batch(batch("a", TagPatch::position(0.5, 0.5)))).await;

        let status = state.status().await;
        assert!(status.connected);
        assert_eq!(status.batches, 1);
        assert!(status.last_batch_at.is_some());

        state.handle_event(FeedEvent::Disconnected { reason: "reset".into() }).await;
        let status = state.status().await;
        assert!(!status.connected);
        assert_eq!(status.last_error.as_deref(), Some("reset"));
        assert_eq!(state.snapshot().await.len(), 1);
    }
}
