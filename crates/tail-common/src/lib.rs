//! tail-common — Shared types used across the Tail demo crates.

pub mod error;
pub mod geometry;
pub mod tag;

// Re-export commonly used types
pub use error::{Result, TailError};
pub use geometry::Floorplan;
pub use tag::{parse_batch, MergeMode, Tag, TagBatch, TagId, TagMap, TagPatch};
