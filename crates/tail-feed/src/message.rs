//! Client messages sent by the positioning server.

use serde::Deserialize;
use tail_common::{Result, TailError};

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Tag", default)]
    tag: Option<String>,
    #[serde(rename = "Coord", default)]
    coord: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// A computed tag position, `[x, y, z]` in metres.
    TagPosition { eui: String, coord: [f64; 3] },
    /// Any message the map does not use (ranging dumps, anchor reports, ...).
    Ignored { kind: String },
}

pub fn parse_message(text: &str) -> Result<ServerMessage> {
    let raw: RawMessage = serde_json::from_str(text)?;
    if raw.kind != "TAG" {
        return Ok(ServerMessage::Ignored { kind: raw.kind });
    }
    let eui = match raw.tag {
        Some(eui) if !eui.is_empty() => eui,
        _ => return Ok(ServerMessage::Ignored { kind: raw.kind }),
    };
    let coord = raw
        .coord
        .ok_or_else(|| TailError::Protocol(format!("TAG message for {} has no Coord", eui)))?;
    match coord.as_slice() {
        [x, y] => Ok(ServerMessage::TagPosition { eui, coord: [*x, *y, 0.0] }),
        [x, y, z, ..] => Ok(ServerMessage::TagPosition { eui, coord: [*x, *y, *z] }),
        _ => Err(TailError::Protocol(format!(
            "TAG message for {} has {} coordinates",
            eui,
            coord.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_message() {
        let msg = parse_message(r#"{"Type":"TAG","Tag":"70b3d5b1e0000014","Coord":[1.25,2.5,0.75]}"#).unwrap();
        assert_eq!(
            msg,
            ServerMessage::TagPosition { eui: "70b3d5b1e0000014".into(), coord: [1.25, 2.5, 0.75] }
        );
    }

    #[test]
    fn test_two_dimensional_coord() {
        let msg = parse_message(r#"{"Type":"TAG","Tag":"t1","Coord":[1.0,2.0]}"#).unwrap();
        assert_eq!(msg, ServerMessage::TagPosition { eui: "t1".into(), coord: [1.0, 2.0, 0.0] });
    }

    #[test]
    fn test_other_types_and_anonymous_tags_are_ignored() {
        assert_eq!(
            parse_message(r#"{"Type":"RX","Anchor":"a1"}"#).unwrap(),
            ServerMessage::Ignored { kind: "RX".into() }
        );
        assert!(matches!(
            parse_message(r#"{"Type":"TAG","Tag":null,"Coord":[0,0,0]}"#).unwrap(),
            ServerMessage::Ignored { .. }
        ));
        assert!(matches!(
            parse_message(r#"{"Type":"TAG","Tag":"","Coord":[0,0,0]}"#).unwrap(),
            ServerMessage::Ignored { .. }
        ));
    }

    #[test]
    fn test_malformed_tag_messages() {
        assert!(parse_message("not json").is_err());
        assert!(parse_message(r#"{"Tag":"t1"}"#).is_err());
        assert!(matches!(
            parse_message(r#"{"Type":"TAG","Tag":"t1"}"#),
            Err(TailError::Protocol(_))
        ));
        assert!(matches!(
            parse_message(r#"{"Type":"TAG","Tag":"t1","Coord":[1.0]}"#),
            Err(TailError::Protocol(_))
        ));
    }
}
