//! Wire protocol definitions
//!
//! JSON-framed bidirectional protocol using Serde's tagged enums for
//! type-safe serialization/deserialization. Tags are snake_case, field
//! names camelCase, matching the browser client.

use serde::{Deserialize, Serialize};

use crate::card::{Card, Color};
use crate::error::{GameError, RoomError};
use crate::game::{GameState, Player};
use crate::types::PlayerId;

/// Client → Server message
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join the room's player roster
    #[serde(rename_all = "camelCase")]
    JoinGame { player_name: String },
    /// Start a round with the current roster
    StartGame,
    /// An in-game action
    GameAction { action: GameAction },
    /// Leave the room (removes the player from the game)
    LeaveGame,
}

/// In-game action, nested inside [`ClientMessage::GameAction`]
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameAction {
    /// Play a card from the hand; wilds must carry a chosen color
    #[serde(rename_all = "camelCase")]
    PlayCard {
        player_id: PlayerId,
        card: Card,
        chosen_color: Option<Color>,
    },
    /// Draw one card, ending the turn
    #[serde(rename_all = "camelCase")]
    DrawCard { player_id: PlayerId },
    /// Declare UNO
    #[serde(rename_all = "camelCase")]
    CallUno { player_id: PlayerId },
    /// Challenge a missed UNO call
    #[serde(rename_all = "camelCase")]
    ChallengeUno {
        challenger_id: PlayerId,
        target_player_id: PlayerId,
    },
}

/// Server → Client message
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sanitized, viewer-specific view of the game
    GameState { state: GameState },
    /// A round started; carries the viewer's sanitized view
    GameStarted { state: GameState },
    /// A player emptied their hand
    #[serde(rename_all = "camelCase")]
    GameOver {
        winner_id: PlayerId,
        winner_name: String,
    },
    /// Roster update: someone joined
    PlayerJoined { player: Player },
    /// A player left or disconnected
    #[serde(rename_all = "camelCase")]
    PlayerLeft { player_id: PlayerId },
    /// Request failed; sent only to the originating connection
    Error { message: String },
}

impl From<RoomError> for ServerMessage {
    fn from(err: RoomError) -> Self {
        ServerMessage::Error {
            message: err.to_string(),
        }
    }
}

impl From<GameError> for ServerMessage {
    fn from(err: GameError) -> Self {
        ServerMessage::Error {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardKind;

    #[test]
    fn test_join_game_deserialize() {
        let json = r#"{"type": "join_game", "playerName": "Alice"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::JoinGame { player_name } => assert_eq!(player_name, "Alice"),
            _ => panic!("Wrong variant"),
        }
    }

    #[test]
    fn test_play_card_action_deserialize() {
        let json = r#"{
            "type": "game_action",
            "action": {
                "type": "play_card",
                "playerId": "player-1",
                "card": {"id": "c-9", "type": "draw2", "color": "green"},
                "chosenColor": null
            }
        }"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        let ClientMessage::GameAction { action } = msg else {
            panic!("Wrong variant");
        };
        match action {
            GameAction::PlayCard {
                player_id,
                card,
                chosen_color,
            } => {
                assert_eq!(player_id.0, "player-1");
                assert_eq!(card.kind, CardKind::DrawTwo);
                assert!(chosen_color.is_none());
            }
            _ => panic!("Wrong action"),
        }
    }

    #[test]
    fn test_wild_play_carries_chosen_color() {
        let json = r#"{
            "type": "play_card",
            "playerId": "player-1",
            "card": {"id": "c-1", "type": "wild", "color": null},
            "chosenColor": "blue"
        }"#;
        let action: GameAction = serde_json::from_str(json).unwrap();
        match action {
            GameAction::PlayCard { chosen_color, .. } => {
                assert_eq!(chosen_color, Some(Color::Blue))
            }
            _ => panic!("Wrong action"),
        }
    }

    #[test]
    fn test_challenge_deserialize() {
        let json = r#"{
            "type": "challenge_uno",
            "challengerId": "player-1",
            "targetPlayerId": "player-2"
        }"#;
        let action: GameAction = serde_json::from_str(json).unwrap();
        match action {
            GameAction::ChallengeUno {
                challenger_id,
                target_player_id,
            } => {
                assert_eq!(challenger_id.0, "player-1");
                assert_eq!(target_player_id.0, "player-2");
            }
            _ => panic!("Wrong action"),
        }
    }

    #[test]
    fn test_unknown_message_type_is_error() {
        let json = r#"{"type": "choose_color", "color": "red"}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_game_over_serialize() {
        let msg = ServerMessage::GameOver {
            winner_id: PlayerId("player-1".into()),
            winner_name: "Alice".into(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"game_over\""));
        assert!(json.contains("\"winnerId\":\"player-1\""));
        assert!(json.contains("\"winnerName\":\"Alice\""));
    }

    #[test]
    fn test_error_from_room_error() {
        let msg: ServerMessage = RoomError::RoomFull.into();
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"error\""));
        assert!(json.contains("\"message\":\"Game is full\""));
    }
}
