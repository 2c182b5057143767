//! tail-web — Web front end for the Tail demo.
//! Provides:
//!   - Floorplan map with live tag markers
//!   - Tag list view
//!   - `/tags` WebSocket push channel (and an SSE mirror)
//!   - Feed status API

pub mod config;
pub mod error;
pub mod feed;
pub mod handlers;
pub mod router;
pub mod sse;
pub mod state;
pub mod templates;
pub mod ws;
