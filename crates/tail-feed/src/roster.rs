//! Tag roster: display names and colours for known tag EUIs.
//!
//! Read from the same JSON document the demo room uses:
//! `{"TAGS": [{"name": ..., "eui": ..., "colour": ...}], "ANCHORS": [...]}`.
//! Anchors are not drawn on the map and are ignored here.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tail_common::{Result, TagPatch};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub eui: String,
    #[serde(default)]
    pub colour: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(rename = "TAGS", default)]
    tags: Vec<RosterEntry>,
}

#[derive(Debug, Clone)]
pub struct Roster {
    entries: HashMap<String, RosterEntry>,
    include_unknown: bool,
}

impl Default for Roster {
    /// Empty roster that lets every tag through.
    fn default() -> Self {
        Self { entries: HashMap::new(), include_unknown: true }
    }
}

impl Roster {
    pub fn new(entries: Vec<RosterEntry>, include_unknown: bool) -> Self {
        let entries = entries.into_iter().map(|e| (e.eui.to_lowercase(), e)).collect();
        Self { entries, include_unknown }
    }

    pub fn from_json(text: &str, include_unknown: bool) -> Result<Self> {
        let file: RosterFile = serde_json::from_str(text)?;
        Ok(Self::new(file.tags, include_unknown))
    }

    pub fn load(path: &Path, include_unknown: bool) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text, include_unknown)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// EUIs are matched case-insensitively.
    pub fn lookup(&self, eui: &str) -> Option<&RosterEntry> {
        self.entries.get(&eui.to_lowercase())
    }

    /// Position patch decorated with roster metadata, or `None` when the tag
    /// is unknown and unknown tags are excluded.
    pub fn patch_for(&self, eui: &str, x: f64, y: f64) -> Option<TagPatch> {
        let patch = TagPatch::position(x, y);
        match self.lookup(eui) {
            Some(entry) => {
                let patch = patch.with_name(entry.name.clone());
                Some(match &entry.colour {
                    Some(colour) => patch.with_color(colour.clone()),
                    None => patch,
                })
            }
            None if self.include_unknown => Some(patch),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ROOM: &str = r#"{
        "ANCHORS": [{"name": "A1", "eui": "70b3d5b1e0000001", "coord": [0, 0, 2]}],
        "TAGS": [
            {"name": "Red", "eui": "70B3D5B1E0000014", "colour": "red"},
            {"name": "Plain", "eui": "70b3d5b1e0000015"}
        ]
    }"#;

    #[test]
    fn test_known_tag_gets_name_and_colour() {
        let roster = Roster::from_json(ROOM, true).unwrap();
        assert_eq!(roster.len(), 2);

        let patch = roster.patch_for("70b3d5b1e0000014", 1.0, 2.0).unwrap();
        assert_eq!(patch.name.as_deref(), Some("Red"));
        assert_eq!(patch.color.as_deref(), Some("red"));
        assert_eq!((patch.x, patch.y), (Some(1.0), Some(2.0)));

        let plain = roster.patch_for("70b3d5b1e0000015", 0.0, 0.0).unwrap();
        assert_eq!(plain.name.as_deref(), Some("Plain"));
        assert_eq!(plain.color, None);
    }

    #[test]
    fn test_unknown_tags_follow_include_flag() {
        let open = Roster::from_json(ROOM, true).unwrap();
        let patch = open.patch_for("ffff", 1.0, 1.0).unwrap();
        assert_eq!(patch.name, None);

        let closed = Roster::from_json(ROOM, false).unwrap();
        assert!(closed.patch_for("ffff", 1.0, 1.0).is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ROOM.as_bytes()).unwrap();

        let roster = Roster::load(file.path(), true).unwrap();
        assert!(roster.lookup("70b3d5b1e0000014").is_some());
        assert!(Roster::load(Path::new("/nonexistent/room.json"), true).is_err());
    }
}
