//! Tag records and the merge step that keeps the live tag map current.
//!
//! The push channel carries batches shaped like `{id: {name, x, y, r, color, dev}}`.
//! Every field of an entry is optional; [`TagMap::apply`] folds a batch into
//! the map with last-write-wins semantics per tag id.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub type TagId = String;

/// Incoming batch of partial tag records, keyed by tag id.
/// Key order is preserved so first-seen order survives a round trip.
pub type TagBatch = IndexMap<TagId, TagPatch>;

/// A tracked tag as held in the presentation cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub x: f64,
    pub y: f64,
    /// Marker radius in floorplan units. Renderers fall back to a default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Position deviation reported by the smoothing filter, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev: Option<f64>,
}

/// Partial tag record as carried on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev: Option<f64>,
}

impl TagPatch {
    /// Patch that only moves a tag.
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_radius(mut self, r: f64) -> Self {
        self.r = Some(r);
        self
    }

    pub fn with_deviation(mut self, dev: f64) -> Self {
        self.dev = Some(dev);
        self
    }
}

/// How a patch for an already-known tag is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Overwrite only the fields the patch carries.
    #[default]
    Fields,
    /// Replace the whole record with the patch.
    Replace,
}

impl Tag {
    /// Build a record from a first-seen patch: name defaults to the id,
    /// position to the origin.
    pub fn from_patch(id: &str, patch: &TagPatch) -> Self {
        Self {
            name: patch.name.clone().unwrap_or_else(|| id.to_string()),
            x: patch.x.unwrap_or(0.0),
            y: patch.y.unwrap_or(0.0),
            r: patch.r,
            color: patch.color.clone(),
            dev: patch.dev,
        }
    }

    fn merge(&mut self, patch: &TagPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(r) = patch.r {
            self.r = Some(r);
        }
        if let Some(color) = &patch.color {
            self.color = Some(color.clone());
        }
        if let Some(dev) = patch.dev {
            self.dev = Some(dev);
        }
    }

    /// The full record expressed as a patch, for pushing to clients.
    pub fn to_patch(&self) -> TagPatch {
        TagPatch {
            name: Some(self.name.clone()),
            x: Some(self.x),
            y: Some(self.y),
            r: self.r,
            color: self.color.clone(),
            dev: self.dev,
        }
    }
}

/// Decode one push-channel payload.
pub fn parse_batch(text: &str) -> Result<TagBatch> {
    Ok(serde_json::from_str(text)?)
}

/// Insertion-ordered mapping of tag id to its latest record.
/// Tags are added on first sight and never removed.
#[derive(Debug, Clone, Default)]
pub struct TagMap {
    tags: IndexMap<TagId, Tag>,
}

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Tag> {
        self.tags.get(id)
    }

    /// Tags in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&TagId, &Tag)> {
        self.tags.iter()
    }

    /// Merge a batch and return the ids whose stored record changed,
    /// in batch order.
    pub fn apply(&mut self, batch: &TagBatch, mode: MergeMode) -> Vec<TagId> {
        let mut changed = Vec::new();
        for (id, patch) in batch {
            match self.tags.get_mut(id) {
                Some(existing) => {
                    let next = match mode {
                        MergeMode::Fields => {
                            let mut merged = existing.clone();
                            merged.merge(patch);
                            merged
                        }
                        MergeMode::Replace => Tag::from_patch(id, patch),
                    };
                    if *existing != next {
                        *existing = next;
                        changed.push(id.clone());
                    }
                }
                None => {
                    self.tags.insert(id.clone(), Tag::from_patch(id, patch));
                    changed.push(id.clone());
                }
            }
        }
        changed
    }

    /// Every tag as a full record.
    pub fn snapshot(&self) -> TagBatch {
        self.tags.iter().map(|(id, tag)| (id.clone(), tag.to_patch())).collect()
    }

    /// Full records for the given ids; unknown ids are skipped.
    pub fn batch_for(&self, ids: &[TagId]) -> TagBatch {
        ids.iter()
            .filter_map(|id| self.tags.get(id).map(|tag| (id.clone(), tag.to_patch())))
            .collect()
    }
}
