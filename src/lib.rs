//! Real-time multiplayer UNO server
//!
//! A session-based UNO game server built with tokio-tungstenite using
//! the Actor pattern for state management.
//!
//! # Features
//! - Room-per-path WebSocket routing
//! - Pure state-transition game engine (play, draw, UNO calls and
//!   challenges, automatic draw-pile reshuffle)
//! - Per-viewer sanitized state broadcasts (other hands are redacted)
//! - Disconnect handling that preserves the player's seat; explicit
//!   leave removes it
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - The `Lobby` actor maps room ids to room actors
//! - Each `Room` actor owns its membership and `GameState`, processing
//!   one command at a time - no locks, rooms run in parallel
//! - Each connection has a `handler` task communicating with its room
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use uno_server::{handle_connection, Lobby, RoomConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await.unwrap();
//!     let lobby = Lobby::spawn(RoomConfig::from_env());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let lobby = lobby.clone();
//!         tokio::spawn(handle_connection(stream, lobby));
//!     }
//! }
//! ```

pub mod card;
pub mod config;
pub mod connection;
pub mod error;
pub mod game;
pub mod handler;
pub mod lobby;
pub mod message;
pub mod room;
pub mod types;

// Re-export main types for convenience
pub use card::{build_shuffled_deck, can_play_card, Card, CardKind, Color};
pub use config::RoomConfig;
pub use connection::Connection;
pub use error::{AppError, GameError, RoomError, SendError};
pub use game::{GameState, Phase, Player};
pub use handler::handle_connection;
pub use lobby::{Lobby, LobbyHandle};
pub use message::{ClientMessage, GameAction, ServerMessage};
pub use room::{sanitize_state_for, Room, RoomCommand};
pub use types::{ConnectionId, PlayerId, RoomId};
