//! Basic type definitions for the game server
//!
//! Provides newtype wrappers for type safety:
//! - `ConnectionId`: UUID-based unique connection identifier
//! - `PlayerId`: stable player identifier derived from the connection
//! - `RoomId`: normalized room identifier taken from the request path

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique connection identifier (newtype pattern)
///
/// Wraps a UUID v4 for type-safe connection identification.
/// Implements Hash and Eq for use as HashMap keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable player identifier
///
/// Derived from the connection that joined the game; outlives transport
/// disconnects (only an explicit leave removes the player).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Derive the player ID for a connection
    pub fn from_connection(conn_id: ConnectionId) -> Self {
        Self(format!("player-{}", conn_id))
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Room identifier
///
/// Taken from the WebSocket request path (e.g. `/my-room`), normalized
/// to lowercase so `/UNO` and `/uno` land in the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(pub String);

impl RoomId {
    /// Create a RoomId from a raw path segment (trims slashes, lowercases)
    pub fn from_path(path: &str) -> Self {
        Self(path.trim_matches('/').to_lowercase())
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_player_id_stable_per_connection() {
        let conn = ConnectionId::new();
        assert_eq!(
            PlayerId::from_connection(conn),
            PlayerId::from_connection(conn)
        );
        assert!(PlayerId::from_connection(conn).0.starts_with("player-"));
    }

    #[test]
    fn test_room_id_normalized() {
        let id = RoomId::from_path("/My-Room/");
        assert_eq!(id.0, "my-room");
        assert_eq!(RoomId::from_path("/UNO"), RoomId::from_path("uno"));
    }
}
