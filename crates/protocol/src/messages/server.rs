//! Server -> Client message parsing.

use crate::{MessageKind, Position, ProtocolError, SessionId};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Parsed server message.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Session init (`type: "init"`).
    Init(InitMessage),
    /// Board update (`type: "map"`).
    Map(MapUpdate),
    /// Log entries (`type: "log"`).
    Log(LogBatch),
    /// Empty object, sent every tick with no changes.
    KeepAlive,
}

impl ServerMessage {
    /// Parse a server message from a JSON text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Classify an already decoded JSON object by its `type` field.
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        if value.as_object().is_some_and(|fields| fields.is_empty()) {
            return Ok(ServerMessage::KeepAlive);
        }
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingType)?
            .to_owned();

        match MessageKind::from_name(&kind) {
            Some(MessageKind::Init) => Ok(ServerMessage::Init(serde_json::from_value(value)?)),
            Some(MessageKind::Map) => Ok(ServerMessage::Map(serde_json::from_value(value)?)),
            Some(MessageKind::Log) => Ok(ServerMessage::Log(serde_json::from_value(value)?)),
            Some(MessageKind::KeepAlive) | None => Err(ProtocolError::UnknownType(kind)),
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            ServerMessage::Init(_) => MessageKind::Init,
            ServerMessage::Map(_) => MessageKind::Map,
            ServerMessage::Log(_) => MessageKind::Log,
            ServerMessage::KeepAlive => MessageKind::KeepAlive,
        }
    }
}

/// Session init: assigned identity, grid dimensions and the current board.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InitMessage {
    pub id: SessionId,
    /// Number of rows (y axis).
    pub length: i64,
    /// Number of columns (x axis).
    pub width: i64,
    /// Entities already on the board when the session starts.
    #[serde(flatten)]
    pub board: MapUpdate,
}

/// One batch of sparse entity deltas. Every category is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapUpdate {
    pub explosion: Vec<DeltaItem<ExplosionDelta>>,
    pub bomb: Vec<DeltaItem<BombDelta>>,
    pub wall: Vec<DeltaItem<WallDelta>>,
    pub user: Vec<DeltaItem<UserDelta>>,
    pub entity: Vec<DeltaItem<EntityDelta>>,
}

impl MapUpdate {
    pub fn len(&self) -> usize {
        self.explosion.len() + self.bomb.len() + self.wall.len() + self.user.len() + self.entity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A delta as it arrived: either decoded, or kept raw when it did not match
/// the category's shape. One bad item never rejects the whole batch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DeltaItem<T> {
    Valid(T),
    Malformed(Value),
}

impl<T> DeltaItem<T> {
    pub fn valid(&self) -> Option<&T> {
        match self {
            DeltaItem::Valid(delta) => Some(delta),
            DeltaItem::Malformed(_) => None,
        }
    }
}

impl<T> From<T> for DeltaItem<T> {
    fn from(delta: T) -> Self {
        DeltaItem::Valid(delta)
    }
}

/// Orientation of an explosion arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum Direction {
    /// `"v"`
    Vertical,
    /// `"h"`
    Horizontal,
    /// `"f"` (blast centre) or anything unrecognised.
    #[default]
    Other,
}

impl From<String> for Direction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "v" => Direction::Vertical,
            "h" => Direction::Horizontal,
            _ => Direction::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExplosionDelta {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub dead: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BombDelta {
    pub x: i32,
    pub y: i32,
    /// Fuse stage, 1..=3.
    #[serde(default)]
    pub bomb_state: i64,
    #[serde(default)]
    pub dead: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WallDelta {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub dead: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserDelta {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub id: Option<SessionId>,
    /// Skin ordinal; only 1..=4 resolve to a visual.
    #[serde(rename = "mod", default)]
    pub skin: i64,
    #[serde(default)]
    pub can_drop: bool,
    #[serde(default)]
    pub killed: u32,
    #[serde(default)]
    pub deaths: u32,
    #[serde(default)]
    pub suicides: u32,
}

/// Neutral cell (grass) left behind when something vanished.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntityDelta {
    pub x: i32,
    pub y: i32,
}

macro_rules! impl_position {
    ($($ty:ty),*) => {
        $(impl $ty {
            #[inline]
            pub fn position(&self) -> Position {
                Position::new(self.x, self.y)
            }
        })*
    };
}

impl_position!(ExplosionDelta, BombDelta, WallDelta, UserDelta, EntityDelta);

/// Log entries: each a single `{speaker: template}` pair where the speaker
/// key is the speaker's skin ordinal as text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LogBatch {
    #[serde(default)]
    pub logs: Vec<BTreeMap<String, String>>,
}

impl LogBatch {
    /// Flatten entries into `(speaker, template)` pairs, in arrival order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.logs
            .iter()
            .flat_map(|entry| entry.iter().map(|(speaker, text)| (speaker.as_str(), text.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_init_with_board() {
        let msg = ServerMessage::decode(
            r#"{"type":"init","id":"a1","length":10,"width":12,
                "wall":[{"x":1,"y":2,"dead":false,"wall_state":0}]}"#,
        )
        .unwrap();

        let ServerMessage::Init(init) = msg else {
            panic!("expected init");
        };
        assert_eq!(init.id.as_str(), "a1");
        assert_eq!((init.length, init.width), (10, 12));
        assert_eq!(init.board.wall.len(), 1);
        assert_eq!(init.board.wall[0].valid().unwrap().position(), Position::new(1, 2));
        assert!(init.board.user.is_empty());
    }

    #[test]
    fn test_decode_map_keeps_malformed_items_apart() {
        let msg = ServerMessage::decode(
            r#"{"type":"map","bomb":[{"x":"left","y":0},{"x":3,"y":4,"bomb_state":2}]}"#,
        )
        .unwrap();

        let ServerMessage::Map(update) = msg else {
            panic!("expected map");
        };
        assert!(matches!(update.bomb[0], DeltaItem::Malformed(_)));
        let bomb = update.bomb[1].valid().unwrap();
        assert_eq!(bomb.bomb_state, 2);
        assert!(!bomb.dead);
    }

    #[test]
    fn test_decode_user_fields() {
        let msg = ServerMessage::decode(
            r#"{"type":"map","user":[{"id":7,"x":0,"y":1,"mod":3,"can_drop":true,
                "killed":2,"deaths":1,"suicides":0,"dead":false}]}"#,
        )
        .unwrap();

        let ServerMessage::Map(update) = msg else {
            panic!("expected map");
        };
        let user = update.user[0].valid().unwrap();
        assert_eq!(user.id, Some(SessionId::new("7")));
        assert_eq!(user.skin, 3);
        assert!(user.can_drop);
        assert_eq!((user.killed, user.deaths, user.suicides), (2, 1, 0));
    }

    #[test]
    fn test_explosion_direction() {
        let msg = ServerMessage::decode(
            r#"{"type":"map","explosion":[
                {"x":0,"y":0,"direction":"v"},
                {"x":1,"y":0,"direction":"h"},
                {"x":2,"y":0,"direction":"f"},
                {"x":3,"y":0}]}"#,
        )
        .unwrap();

        let ServerMessage::Map(update) = msg else {
            panic!("expected map");
        };
        let directions: Vec<_> = update
            .explosion
            .iter()
            .map(|item| item.valid().unwrap().direction)
            .collect();
        assert_eq!(
            directions,
            vec![Direction::Vertical, Direction::Horizontal, Direction::Other, Direction::Other]
        );
    }

    #[test]
    fn test_decode_log_entries_in_order() {
        let msg = ServerMessage::decode(
            r#"{"type":"log","logs":[{"2":"connected"},{"3":"killed by *2*"}]}"#,
        )
        .unwrap();

        let ServerMessage::Log(batch) = msg else {
            panic!("expected log");
        };
        let entries: Vec<_> = batch.entries().collect();
        assert_eq!(entries, vec![("2", "connected"), ("3", "killed by *2*")]);
    }

    #[test]
    fn test_empty_object_is_keep_alive() {
        let msg = ServerMessage::decode("{}").unwrap();
        assert_eq!(msg, ServerMessage::KeepAlive);
        assert_eq!(msg.kind(), MessageKind::KeepAlive);
        assert!(ServerMessage::decode(" { } ").is_ok());
        // only a bare object counts, not an empty array
        assert!(matches!(ServerMessage::decode("[]"), Err(ProtocolError::MissingType)));
    }

    #[test]
    fn test_unknown_and_missing_type() {
        assert!(matches!(
            ServerMessage::decode(r#"{"type":"score"}"#),
            Err(ProtocolError::UnknownType(kind)) if kind == "score"
        ));
        assert!(matches!(
            ServerMessage::decode(r#"{"logs":[]}"#),
            Err(ProtocolError::MissingType)
        ));
        assert!(matches!(
            ServerMessage::decode("not json"),
            Err(ProtocolError::Malformed(_))
        ));
    }
}
