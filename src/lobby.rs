//! Lobby actor: the room registry
//!
//! Resolves a room id to that room's command channel, spawning the
//! room task on first use. Rooms whose task has ended (last connection
//! gone) are replaced on the next checkout.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::config::RoomConfig;
use crate::error::AppError;
use crate::room::{Room, RoomCommand};
use crate::types::RoomId;

/// Channel buffer size for lobby commands
const COMMAND_BUFFER_SIZE: usize = 64;

/// Commands sent from connection handlers to the lobby actor
#[derive(Debug)]
pub enum LobbyCommand {
    /// Resolve a room's command sender, creating the room if needed
    Checkout {
        room_id: RoomId,
        reply: oneshot::Sender<mpsc::Sender<RoomCommand>>,
    },
}

/// Cloneable handle for talking to the lobby
#[derive(Debug, Clone)]
pub struct LobbyHandle {
    sender: mpsc::Sender<LobbyCommand>,
}

impl LobbyHandle {
    /// Resolve the command channel for `room_id`
    pub async fn checkout(&self, room_id: RoomId) -> Result<mpsc::Sender<RoomCommand>, AppError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(LobbyCommand::Checkout { room_id, reply })
            .await
            .map_err(|_| AppError::ChannelSend)?;
        rx.await.map_err(|_| AppError::ChannelSend)
    }
}

/// The lobby actor
pub struct Lobby {
    rooms: HashMap<RoomId, mpsc::Sender<RoomCommand>>,
    config: RoomConfig,
    receiver: mpsc::Receiver<LobbyCommand>,
}

impl Lobby {
    /// Create a lobby reading from the given command channel
    pub fn new(config: RoomConfig, receiver: mpsc::Receiver<LobbyCommand>) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
            receiver,
        }
    }

    /// Spawn the lobby actor task and return a handle to it
    pub fn spawn(config: RoomConfig) -> LobbyHandle {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER_SIZE);
        let lobby = Lobby::new(config, rx);
        tokio::spawn(lobby.run());
        LobbyHandle { sender: tx }
    }

    /// Run the lobby event loop
    pub async fn run(mut self) {
        info!("Lobby started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                LobbyCommand::Checkout { room_id, reply } => {
                    let sender = self.checkout(room_id);
                    let _ = reply.send(sender);
                }
            }
        }

        info!("Lobby shutting down");
    }

    /// Fetch the room's channel, spawning or replacing its actor
    fn checkout(&mut self, room_id: RoomId) -> mpsc::Sender<RoomCommand> {
        if let Some(sender) = self.rooms.get(&room_id) {
            if !sender.is_closed() {
                return sender.clone();
            }
            debug!("Room {} task ended; replacing", room_id);
        }

        let sender = Room::spawn(room_id.clone(), self.config);
        info!("Room {} created", room_id);
        self.rooms.insert(room_id, sender.clone());
        sender
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConnectionId;
    use std::time::Duration;

    #[tokio::test]
    async fn test_checkout_reuses_live_room() {
        let lobby = Lobby::spawn(RoomConfig::default());

        let a = lobby.checkout(RoomId::from_path("/alpha")).await.unwrap();
        let b = lobby.checkout(RoomId::from_path("/alpha")).await.unwrap();
        assert!(a.same_channel(&b));

        let other = lobby.checkout(RoomId::from_path("/beta")).await.unwrap();
        assert!(!a.same_channel(&other));
    }

    #[tokio::test]
    async fn test_checkout_replaces_closed_room() {
        let lobby = Lobby::spawn(RoomConfig::default());
        let first = lobby.checkout(RoomId::from_path("/gamma")).await.unwrap();

        // Attach and detach one connection so the room task exits
        let conn_id = ConnectionId::new();
        let (tx, _rx) = mpsc::channel(8);
        first
            .send(RoomCommand::Connect { conn_id, sender: tx })
            .await
            .unwrap();
        first.send(RoomCommand::Disconnect { conn_id }).await.unwrap();

        // Wait for the actor to drop its receiver
        for _ in 0..100 {
            if first.is_closed() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(first.is_closed());

        let second = lobby.checkout(RoomId::from_path("/gamma")).await.unwrap();
        assert!(!first.same_channel(&second));
    }
}
