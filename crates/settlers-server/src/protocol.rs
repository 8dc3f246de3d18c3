//! WebSocket protocol messages for settlers multiplayer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use settlers_core::{GameAction, PlayerColor, PlayerId, Snapshot};
use thiserror::Error;
use uuid::Uuid;

/// Short room identifier handed to clients
pub type RoomId = String;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Create a new room and start its session
    CreateRoom { player_names: Vec<String> },

    /// Join a room, optionally as one of its players
    JoinRoom {
        room_id: RoomId,
        #[serde(default)]
        player_id: Option<PlayerId>,
    },

    /// Leave current room
    LeaveRoom,

    /// Submit a game action
    Action(ActionEnvelope),

    /// Ping for keepalive
    Ping,
}

/// Inbound game action as the client sends it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    pub room_id: RoomId,
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Malformed client input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Invalid action: {0}")]
    Validation(String),
}

impl ActionEnvelope {
    pub fn new(room_id: impl Into<RoomId>, action_type: &str, payload: serde_json::Value) -> Self {
        Self {
            room_id: room_id.into(),
            action_type: action_type.to_string(),
            payload,
        }
    }

    /// Parse into a typed action. The payload is ignored for actions that take none.
    pub fn to_action(&self) -> Result<GameAction, ProtocolError> {
        let tagged = match self.action_type.as_str() {
            "roll_dice" | "end_turn" => serde_json::json!({ "type": self.action_type }),
            _ => serde_json::json!({ "type": self.action_type, "payload": self.payload }),
        };
        serde_json::from_value(tagged).map_err(|e| ProtocolError::Validation(e.to_string()))
    }
}

/// Roster entry returned when a room is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: PlayerId,
    pub name: String,
    pub color: PlayerColor,
}

/// Room lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Created,
}

/// Response to a successful `create_room`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomCreated {
    pub room_id: RoomId,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    pub players: Vec<RosterEntry>,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Welcome message with the connection's id
    Welcome { connection_id: Uuid },

    /// Room created successfully
    RoomCreated(RoomCreated),

    /// Joined room successfully
    JoinedRoom {
        room_id: RoomId,
        player_id: Option<PlayerId>,
    },

    /// Left room successfully
    LeftRoom,

    /// Full session snapshot
    GameState { state: Box<Snapshot> },

    /// Error occurred
    Error { message: String },

    /// Pong response
    Pong,
}

impl ServerMessage {
    pub fn error(message: impl ToString) -> Self {
        ServerMessage::Error {
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settlers_core::{Direction, HexCoord, Placement};

    fn envelope(action_type: &str, payload: serde_json::Value) -> ActionEnvelope {
        ActionEnvelope::new("abcd1234", action_type, payload)
    }

    #[test]
    fn test_parse_client_action_message() {
        let text = r#"{"type":"action","payload":{"room_id":"abcd1234","type":"build_road","payload":{"hex":{"q":0,"r":0,"s":0},"direction":2}}}"#;
        let msg: ClientMessage = serde_json::from_str(text).unwrap();
        let ClientMessage::Action(envelope) = msg else {
            panic!("expected an action");
        };
        assert_eq!(envelope.room_id, "abcd1234");
        assert_eq!(
            envelope.to_action(),
            Ok(GameAction::BuildRoad(Placement::new(
                HexCoord::ORIGIN,
                Direction::SOUTH_WEST
            )))
        );
    }

    #[test]
    fn test_payload_ignored_for_roll_and_end() {
        let action = envelope("roll_dice", serde_json::json!({"anything": 1})).to_action();
        assert_eq!(action, Ok(GameAction::RollDice));
        let action = envelope("end_turn", serde_json::Value::Null).to_action();
        assert_eq!(action, Ok(GameAction::EndTurn));
    }

    #[test]
    fn test_validation_errors() {
        let cases = [
            envelope("trade", serde_json::json!({})),
            envelope("build_road", serde_json::json!({})),
            envelope("build_road", serde_json::json!({"hex": {"q": 1, "r": 1, "s": 1}, "direction": 0})),
            envelope("build_settlement", serde_json::json!({"hex": {"q": 0, "r": 0, "s": 0}, "direction": 6})),
            envelope("move_robber", serde_json::json!({"hex": "center"})),
        ];
        for case in cases {
            assert!(
                matches!(case.to_action(), Err(ProtocolError::Validation(_))),
                "{case:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_join_room_player_id_optional() {
        let text = r#"{"type":"join_room","payload":{"room_id":"abcd1234"}}"#;
        let msg: ClientMessage = serde_json::from_str(text).unwrap();
        assert!(matches!(msg, ClientMessage::JoinRoom { player_id: None, .. }));
    }

    #[test]
    fn test_server_message_tags() {
        let json = serde_json::to_value(ServerMessage::error("Not your turn")).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["payload"]["message"], "Not your turn");

        let json = serde_json::to_value(ServerMessage::Pong).unwrap();
        assert_eq!(json["type"], "pong");
    }
}
