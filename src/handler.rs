//! WebSocket connection handler
//!
//! Handles individual client connections: WebSocket handshake (the
//! request path selects the room), message parsing, and bidirectional
//! plumbing between the socket and the room actor.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::lobby::LobbyHandle;
use crate::message::{ClientMessage, ServerMessage};
use crate::room::RoomCommand;
use crate::types::{ConnectionId, RoomId};

/// Room used when the client connects to the bare path `/`
const DEFAULT_ROOM: &str = "lobby";

/// Handle a new TCP connection
///
/// Performs the WebSocket handshake, resolves the target room from the
/// request path, and manages the connection lifecycle.
pub async fn handle_connection(stream: TcpStream, lobby: LobbyHandle) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    // WebSocket handshake; the request path names the room
    let mut path = String::new();
    let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        path = req.uri().path().to_string();
        Ok(resp)
    };
    let ws_stream = tokio_tungstenite::accept_hdr_async(stream, callback).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let mut room_id = RoomId::from_path(&path);
    if room_id.0.is_empty() {
        room_id = RoomId::from_path(DEFAULT_ROOM);
    }

    let conn_id = ConnectionId::new();
    info!(
        "Connection {} from {} attached to room {}",
        conn_id, peer_addr, room_id
    );

    let room = lobby.checkout(room_id).await?;

    // Channel for room -> client messages
    let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(32);

    if room
        .send(RoomCommand::Connect {
            conn_id,
            sender: msg_tx.clone(),
        })
        .await
        .is_err()
    {
        error!("Failed to register connection {} - room closed", conn_id);
        return Err(AppError::ChannelSend);
    }

    // Read task (WebSocket -> RoomCommand); parse failures are
    // reported back to this connection only
    let room_read = room.clone();
    let err_tx = msg_tx;
    let read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => match decode_client_message(&text) {
                    Ok(client_msg) => {
                        let cmd = client_message_to_command(conn_id, client_msg);
                        if room_read.send(cmd).await.is_err() {
                            debug!("Room closed, ending read task for {}", conn_id);
                            break;
                        }
                    }
                    Err(message) => {
                        warn!("Bad message from {}: {}", conn_id, message);
                        let _ = err_tx.send(ServerMessage::Error { message }).await;
                    }
                },
                Ok(Message::Close(_)) => {
                    debug!("Connection {} sent close frame", conn_id);
                    break;
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // Pong is handled automatically by tungstenite
                }
                Ok(_) => {
                    // Binary or other frame types - ignore
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", conn_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", conn_id);
    });

    // Write task (ServerMessage -> WebSocket)
    let write_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                    // Continue - don't break on serialization errors
                }
            }
        }
        debug!("Write task ended for connection");

        // Send close frame when done
        let _ = ws_sender.close().await;
    });

    // Wait for either task to complete
    tokio::select! {
        _ = read_task => {
            debug!("Read task completed for {}", conn_id);
        }
        _ = write_task => {
            debug!("Write task completed for {}", conn_id);
        }
    }

    // Transport-level disconnect: the room keeps the player's seat
    let _ = room.send(RoomCommand::Disconnect { conn_id }).await;

    info!("Connection {} closed", conn_id);

    Ok(())
}

/// Decode one inbound frame, distinguishing malformed JSON from an
/// unknown message kind
fn decode_client_message(text: &str) -> Result<ClientMessage, String> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|_| "Invalid message format".to_string())?;
    serde_json::from_value(value).map_err(|e| format!("Unknown message type: {}", e))
}

/// Convert a ClientMessage to a RoomCommand
fn client_message_to_command(conn_id: ConnectionId, msg: ClientMessage) -> RoomCommand {
    match msg {
        ClientMessage::JoinGame { player_name } => RoomCommand::Join {
            conn_id,
            player_name,
        },
        ClientMessage::StartGame => RoomCommand::Start { conn_id },
        ClientMessage::GameAction { action } => RoomCommand::Action { conn_id, action },
        ClientMessage::LeaveGame => RoomCommand::Leave { conn_id },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_non_json() {
        let err = decode_client_message("not json at all").unwrap_err();
        assert_eq!(err, "Invalid message format");
    }

    #[test]
    fn test_decode_rejects_unknown_kind() {
        let err = decode_client_message(r#"{"type": "choose_color"}"#).unwrap_err();
        assert!(err.starts_with("Unknown message type"));
    }

    #[test]
    fn test_decode_accepts_known_kind() {
        let msg = decode_client_message(r#"{"type": "start_game"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::StartGame));
    }

    #[test]
    fn test_message_to_command_carries_connection() {
        let conn_id = ConnectionId::new();
        let cmd = client_message_to_command(
            conn_id,
            ClientMessage::JoinGame {
                player_name: "Alice".into(),
            },
        );
        match cmd {
            RoomCommand::Join {
                conn_id: c,
                player_name,
            } => {
                assert_eq!(c, conn_id);
                assert_eq!(player_name, "Alice");
            }
            _ => panic!("Wrong command"),
        }
    }
}
