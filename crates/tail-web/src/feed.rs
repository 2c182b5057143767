//! Wiring between the configured tag source and the shared state.

use std::sync::Arc;

use tail_feed::{EmulatorSource, FeedEvent, Roster, RtlsSource, TagSource};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::{FeedConfig, FeedKind, MapConfig};
use crate::state::SharedState;

/// Build the tag source named by the feed configuration.
pub fn build_source(feed: &FeedConfig, map: &MapConfig) -> anyhow::Result<Arc<dyn TagSource>> {
    let source: Arc<dyn TagSource> = match feed.kind {
        FeedKind::Rtls => {
            let roster = match &feed.roster {
                Some(path) => {
                    let roster = Roster::load(path, feed.include_unknown)?;
                    info!("Loaded {} tags from roster {}", roster.len(), path.display());
                    roster
                }
                None => Roster::default(),
            };
            Arc::new(
                RtlsSource::new(feed.host.clone(), feed.port)
                    .with_roster(roster)
                    .with_filter_len(feed.filter_len)
                    .with_reconnect_delay(feed.reconnect_delay()),
            )
        }
        FeedKind::Emulator => Arc::new(EmulatorSource::new(
            feed.emulated_tags,
            map.floorplan(),
            feed.interval(),
        )),
    };
    Ok(source)
}

/// Start the source and the merge loop. The merge loop is the only writer
/// of the tag map; it ends when the source task drops its sender.
pub fn spawn_feed(state: SharedState, source: Arc<dyn TagSource>) -> JoinHandle<()> {
    let (tx, mut rx) = mpsc::channel::<FeedEvent>(256);

    tokio::spawn(async move {
        info!("Starting tag feed '{}'", source.name());
        if let Err(e) = source.run(tx).await {
            error!("Tag feed '{}' stopped: {:#}", source.name(), e);
        }
    });

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            state.handle_event(event).await;
        }
    })
}
