//! Error types for the game server
//!
//! `AppError` covers transport-fatal conditions that end a connection
//! handler. `GameError` and `RoomError` cover the player-visible
//! taxonomy: all of them are local and non-fatal, reported only to the
//! originating connection and never mutating committed state.

use thiserror::Error;

/// Application-level errors (connection handler scope)
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,
}

/// Engine transition errors
///
/// Returned by a rejected `GameState` transition; the caller keeps the
/// previous state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    /// A game needs at least two players
    #[error("Need at least 2 players to start")]
    NotEnoughPlayers,

    /// Action submitted by a player who does not hold the turn
    #[error("Not your turn")]
    NotYourTurn,

    /// The played card is not in the acting player's hand
    #[error("Card not in your hand")]
    CardNotOwned,

    /// The card does not match the top of the discard or the active color
    #[error("Card cannot be played")]
    IllegalCard,

    /// A wild was played without choosing a color
    #[error("Wild cards require a color choice")]
    MissingColorChoice,

    /// UNO call from a player not at one or two cards
    #[error("You can only call UNO with one or two cards left")]
    NotEligible,

    /// Challenge against a player who called UNO or holds more than one card
    #[error("Invalid UNO challenge")]
    InvalidChallenge,

    /// Both piles exhausted; cannot supply a card
    #[error("Draw pile exhausted")]
    DeckExhausted,
}

/// Room-level errors (capacity and phase)
#[derive(Debug, Error)]
pub enum RoomError {
    /// Room is at its configured player capacity
    #[error("Game is full")]
    RoomFull,

    /// A round is currently being played
    #[error("Game already in progress")]
    GameInProgress,

    /// Start requested with too few members
    #[error("Need at least {0} players to start")]
    NotEnoughPlayers(usize),

    /// Game action before any game was started
    #[error("Game not started")]
    GameNotStarted,

    /// Game action outside the playing phase
    #[error("Game not in playing phase")]
    WrongPhase,

    /// Engine rejected the action
    #[error("{0}")]
    Game(#[from] GameError),
}

/// Message send errors
///
/// Occurs when attempting to send messages through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
