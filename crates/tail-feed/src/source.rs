//! Tag feed sources.
//!
//! A source pushes [`FeedEvent`]s into an mpsc channel until the receiving
//! side goes away. Two sources exist: the positioning server client and an
//! emulator that walks a few tags around the floorplan.

use std::time::Duration;

use async_trait::async_trait;
use tail_common::{Floorplan, TagBatch, TagPatch, TailError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::filter::FilterBank;
use crate::message::{parse_message, ServerMessage};
use crate::pipe::MessagePipe;
use crate::roster::Roster;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// The source reached its upstream.
    Connected,
    /// The upstream went away; the source will retry on its own.
    Disconnected { reason: String },
    Batch(TagBatch),
}

/// Common interface for all tag feeds.
#[async_trait]
pub trait TagSource: Send + Sync {
    fn name(&self) -> &str;

    /// Produce events until `sink` is closed.
    async fn run(&self, sink: mpsc::Sender<FeedEvent>) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Positioning server client
// ---------------------------------------------------------------------------

pub struct RtlsSource {
    host: String,
    port: u16,
    roster: Roster,
    filter_len: usize,
    reconnect_delay: Duration,
}

impl RtlsSource {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            roster: Roster::default(),
            filter_len: 1,
            reconnect_delay: Duration::from_secs(1),
        }
    }

    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_filter_len(mut self, filter_len: usize) -> Self {
        self.filter_len = filter_len;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Turn one server message into a single-tag batch. With smoothing on,
    /// the record also carries the filter deviation.
    fn handle(&self, text: &str, filters: &mut FilterBank) -> tail_common::Result<Option<TagBatch>> {
        match parse_message(text)? {
            ServerMessage::TagPosition { eui, coord } => {
                let smoothed = filters.update(&eui, coord);
                let Some(patch) = self.roster.patch_for(&eui, smoothed[0], smoothed[1]) else {
                    return Ok(None);
                };
                let patch = match filters.get(&eui) {
                    Some(filter) if filters.smoothing() => patch.with_deviation(filter.deviation()),
                    _ => patch,
                };
                Ok(Some(TagBatch::from([(eui, patch)])))
            }
            ServerMessage::Ignored { kind } => {
                debug!("Ignoring {} message", kind);
                Ok(None)
            }
        }
    }

    /// Read one connection until it drops. Returns `None` when the sink closed.
    async fn pump(
        &self,
        mut pipe: MessagePipe<tokio::net::TcpStream>,
        filters: &mut FilterBank,
        sink: &mpsc::Sender<FeedEvent>,
    ) -> Option<String> {
        loop {
            match pipe.recv_msg().await {
                Ok(Some(text)) => match self.handle(&text, filters) {
                    Ok(Some(batch)) => {
                        if sink.send(FeedEvent::Batch(batch)).await.is_err() {
                            return None;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!("Skipping malformed server message: {}", e),
                },
                Ok(None) => return Some("connection closed by server".to_string()),
                Err(TailError::Malformed(reason)) => warn!("Skipping malformed server message: {}", reason),
                Err(e) => return Some(e.to_string()),
            }
        }
    }
}

#[async_trait]
impl TagSource for RtlsSource {
    fn name(&self) -> &str {
        "rtls"
    }

    async fn run(&self, sink: mpsc::Sender<FeedEvent>) -> anyhow::Result<()> {
        let mut filters = FilterBank::new(self.filter_len);
        loop {
            match MessagePipe::connect(&self.host, self.port).await {
                Ok(pipe) => {
                    info!("Connected to positioning server {}:{}", self.host, self.port);
                    if sink.send(FeedEvent::Connected).await.is_err() {
                        return Ok(());
                    }
                    let Some(reason) = self.pump(pipe, &mut filters, &sink).await else {
                        return Ok(());
                    };
                    warn!("Lost positioning server {}:{}: {}", self.host, self.port, reason);
                    if sink.send(FeedEvent::Disconnected { reason }).await.is_err() {
                        return Ok(());
                    }
                }
                Err(e) => {
                    debug!("Cannot reach positioning server {}:{}: {}", self.host, self.port, e);
                }
            }
            if sink.is_closed() {
                return Ok(());
            }
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Emulator
// ---------------------------------------------------------------------------

const PALETTE: [&str; 6] = ["#d9534f", "#0275d8", "#5cb85c", "#f0ad4e", "#5bc0de", "#6f42c1"];

/// Moves `count` tags on concentric circles around the floorplan centre.
pub struct EmulatorSource {
    count: usize,
    floorplan: Floorplan,
    interval: Duration,
}

impl EmulatorSource {
    pub fn new(count: usize, floorplan: Floorplan, interval: Duration) -> Self {
        Self { count, floorplan, interval }
    }

    pub fn tag_id(index: usize) -> String {
        format!("emu-{:02}", index + 1)
    }

    /// Positions of every tag at tick `step`. Tags keep inside the plan.
    pub fn positions(&self, step: u64) -> Vec<(String, f64, f64)> {
        let (cx, cy) = (self.floorplan.width / 2.0, self.floorplan.height / 2.0);
        let max_radius = cx.min(cy) * 0.8;
        (0..self.count)
            .map(|i| {
                let radius = max_radius * (i + 1) as f64 / self.count as f64;
                let speed = 0.2 / (i + 1) as f64;
                let phase = i as f64 * std::f64::consts::TAU / self.count as f64;
                let angle = phase + speed * step as f64;
                (Self::tag_id(i), cx + radius * angle.cos(), cy + radius * angle.sin())
            })
            .collect()
    }

    /// Batch for tick `step`. Every entry is a full record, so it survives
    /// whole-record replacement.
    pub fn batch(&self, step: u64) -> TagBatch {
        self.positions(step)
            .into_iter()
            .enumerate()
            .map(|(i, (id, x, y))| {
                let patch = TagPatch::position(x, y)
                    .with_name(format!("Tag {}", i + 1))
                    .with_color(PALETTE[i % PALETTE.len()]);
                (id, patch)
            })
            .collect()
    }
}

#[async_trait]
impl TagSource for EmulatorSource {
    fn name(&self) -> &str {
        "emulator"
    }

    async fn run(&self, sink: mpsc::Sender<FeedEvent>) -> anyhow::Result<()> {
        info!("Emulating {} tags every {:?}", self.count, self.interval);
        if sink.send(FeedEvent::Connected).await.is_err() {
            return Ok(());
        }
        let mut ticker = tokio::time::interval(self.interval);
        let mut step = 0u64;
        loop {
            ticker.tick().await;
            if sink.send(FeedEvent::Batch(self.batch(step))).await.is_err() {
                return Ok(());
            }
            step += 1;
        }
    }
}
