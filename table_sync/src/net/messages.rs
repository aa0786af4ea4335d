use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::{FrameError, Result};
use crate::game::entities::{Chips, PlayerId, Snapshot};

/// Betting actions a player can submit. Legality is decided by the server.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Raise,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Fold => "fold",
            Self::Check => "check",
            Self::Call => "call",
            Self::Raise => "raise",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerAction {
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Chips>,
}

impl PlayerAction {
    pub fn new(action: ActionKind) -> Self {
        Self {
            action,
            amount: None,
        }
    }

    pub fn raise(amount: Chips) -> Self {
        Self {
            action: ActionKind::Raise,
            amount: Some(amount),
        }
    }
}

/// A frame sent from this client to the server.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientFrame {
    PlayerJoin {
        name: String,
    },
    PlayerReady {
        #[serde(rename = "isReady")]
        is_ready: bool,
    },
    PlayerAction(PlayerAction),
    ChatMessage {
        message: String,
    },
}

impl ClientFrame {
    /// Encode the frame as socket text.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be serialized.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(FrameError::Encode)
    }
}

impl fmt::Display for ClientFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerJoin { name } => write!(f, "join as {name}"),
            Self::PlayerReady { is_ready } => {
                write!(f, "{}", if *is_ready { "ready" } else { "not ready" })
            }
            Self::PlayerAction(PlayerAction {
                action,
                amount: Some(amount),
            }) => write!(f, "{action} {amount}"),
            Self::PlayerAction(PlayerAction { action, .. }) => write!(f, "{action}"),
            Self::ChatMessage { message } => write!(f, "say {message}"),
        }
    }
}

/// Anything that can carry client frames to the server. Implementations
/// drop frames they cannot deliver and report that through the return
/// value; callers must tolerate silent drops.
pub trait Outbound {
    fn send(&mut self, frame: &ClientFrame) -> bool;
}

/// A frame pushed by the server.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Assigns the local identity. Sent once near connection start.
    PlayerId { id: PlayerId },
    /// Full table snapshot, sent on every authoritative change.
    GameState(Box<Snapshot>),
}

impl ServerFrame {
    /// Decode socket text into a frame.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Json`] for text that is not JSON and
    /// [`FrameError::Schema`] for JSON with an unknown type or a payload
    /// of the wrong shape.
    pub fn decode(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text).map_err(FrameError::Json)?;
        serde_json::from_value(value).map_err(FrameError::Schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_player_action() {
        let frame = ClientFrame::PlayerAction(PlayerAction::raise(60));
        assert_eq!(
            frame.encode().unwrap(),
            r#"{"type":"player_action","payload":{"action":"raise","amount":60}}"#
        );

        let frame = ClientFrame::PlayerAction(PlayerAction::new(ActionKind::Check));
        assert_eq!(
            frame.encode().unwrap(),
            r#"{"type":"player_action","payload":{"action":"check"}}"#
        );
    }

    #[test]
    fn test_encode_ready_and_join() {
        let frame = ClientFrame::PlayerReady { is_ready: true };
        assert_eq!(
            frame.encode().unwrap(),
            r#"{"type":"player_ready","payload":{"isReady":true}}"#
        );

        let frame = ClientFrame::PlayerJoin {
            name: "alice".to_string(),
        };
        assert_eq!(
            frame.encode().unwrap(),
            r#"{"type":"player_join","payload":{"name":"alice"}}"#
        );
    }

    #[test]
    fn test_decode_player_id() {
        let frame = ServerFrame::decode(r#"{"type":"player_id","payload":{"id":"abc"}}"#).unwrap();
        assert_eq!(
            frame,
            ServerFrame::PlayerId {
                id: PlayerId::new("abc")
            }
        );
    }

    #[test]
    fn test_decode_game_state() {
        let frame = ServerFrame::decode(
            r#"{"type":"game_state","payload":{"pot":30,"gamePhase":"flop","players":{}}}"#,
        )
        .unwrap();
        match frame {
            ServerFrame::GameState(snapshot) => assert_eq!(snapshot.pot, 30),
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            ServerFrame::decode("not json"),
            Err(FrameError::Json(_))
        ));
        assert!(matches!(
            ServerFrame::decode(r#"{"type":"mystery","payload":{}}"#),
            Err(FrameError::Schema(_))
        ));
        assert!(matches!(
            ServerFrame::decode(r#"{"type":"player_id","payload":{"nope":1}}"#),
            Err(FrameError::Schema(_))
        ));
    }

    #[test]
    fn test_frame_display() {
        assert_eq!(
            ClientFrame::PlayerAction(PlayerAction::raise(80)).to_string(),
            "raise 80"
        );
        assert_eq!(
            ClientFrame::PlayerAction(PlayerAction::new(ActionKind::Fold)).to_string(),
            "fold"
        );
    }
}
