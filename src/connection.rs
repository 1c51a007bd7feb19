//! Connection handle
//!
//! The opaque per-connection handle the room holds: an id plus the
//! outbound message channel. The room never touches the socket itself.

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::ConnectionId;

/// Handle to one connected client
#[derive(Debug)]
pub struct Connection {
    /// Unique identifier for this connection
    pub id: ConnectionId,
    /// Server → Client message channel
    pub sender: mpsc::Sender<ServerMessage>,
}

impl Connection {
    /// Create a new connection handle
    pub fn new(id: ConnectionId, sender: mpsc::Sender<ServerMessage>) -> Self {
        Self { id, sender }
    }

    /// Send a message to this client
    ///
    /// Returns an error if the channel is closed (client disconnected).
    pub async fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| SendError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_delivers_message() {
        let (tx, mut rx) = mpsc::channel(8);
        let conn = Connection::new(ConnectionId::new(), tx);

        conn.send(ServerMessage::Error {
            message: "nope".into(),
        })
        .await
        .unwrap();

        match rx.recv().await {
            Some(ServerMessage::Error { message }) => assert_eq!(message, "nope"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_fails_after_receiver_dropped() {
        let (tx, rx) = mpsc::channel(8);
        drop(rx);
        let conn = Connection::new(ConnectionId::new(), tx);

        assert!(conn
            .send(ServerMessage::Error {
                message: "gone".into()
            })
            .await
            .is_err());
    }
}
