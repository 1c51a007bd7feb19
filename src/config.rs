//! Room configuration
//!
//! Capacity bounds consumed from the environment:
//! `UNO_MIN_PLAYERS` / `UNO_MAX_PLAYERS`.

use std::env;

/// Default minimum number of players to start a game
pub const DEFAULT_MIN_PLAYERS: usize = 2;

/// Default room capacity
pub const DEFAULT_MAX_PLAYERS: usize = 10;

/// Per-room capacity bounds
#[derive(Debug, Clone, Copy)]
pub struct RoomConfig {
    pub min_players: usize,
    pub max_players: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: DEFAULT_MIN_PLAYERS,
            max_players: DEFAULT_MAX_PLAYERS,
        }
    }
}

impl RoomConfig {
    /// Read bounds from the environment, falling back to the defaults
    /// for unset or unparseable values. `min_players` never drops below
    /// 2 (the engine rejects smaller games) and `max_players` never
    /// exceeds 10 (the deck cannot deal more opening hands).
    pub fn from_env() -> Self {
        let read = |key: &str, fallback: usize| {
            env::var(key)
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(fallback)
        };

        let min_players = read("UNO_MIN_PLAYERS", DEFAULT_MIN_PLAYERS).clamp(2, DEFAULT_MAX_PLAYERS);
        let max_players =
            read("UNO_MAX_PLAYERS", DEFAULT_MAX_PLAYERS).clamp(min_players, DEFAULT_MAX_PLAYERS);

        Self {
            min_players,
            max_players,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RoomConfig::default();
        assert_eq!(config.min_players, 2);
        assert_eq!(config.max_players, 10);
    }

    #[test]
    fn test_from_env_falls_back_on_garbage() {
        env::set_var("UNO_MIN_PLAYERS", "not-a-number");
        env::set_var("UNO_MAX_PLAYERS", "1");
        let config = RoomConfig::from_env();
        env::remove_var("UNO_MIN_PLAYERS");
        env::remove_var("UNO_MAX_PLAYERS");

        assert_eq!(config.min_players, DEFAULT_MIN_PLAYERS);
        // Capacity is clamped up to the minimum
        assert_eq!(config.max_players, config.min_players);
    }
}
