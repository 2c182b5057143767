//! tail-feed — Upstream tag feeds for the Tail demo.
//!   - Framed TCP client for the positioning server
//!   - Tag roster (names and colours per EUI)
//!   - Per-tag position smoothing
//!   - Tag emulator for demos without hardware

pub mod filter;
pub mod message;
pub mod pipe;
pub mod roster;
pub mod source;

pub use roster::Roster;
pub use source::{EmulatorSource, FeedEvent, RtlsSource, TagSource};
