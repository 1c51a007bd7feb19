//! Room coordinator actor
//!
//! One actor task per room: owns the connection arena, the membership
//! roster, and the game state. Commands are processed one at a time,
//! so no locks guard `GameState` and two racing actions resolve in
//! arrival order; the loser fails the normal turn/legality checks
//! against the committed state. Rooms run as independent tasks.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::card::Card;
use crate::config::RoomConfig;
use crate::connection::Connection;
use crate::error::RoomError;
use crate::game::{GameState, Phase, Player};
use crate::message::{GameAction, ServerMessage};
use crate::types::{ConnectionId, PlayerId, RoomId};

/// Channel buffer size for room commands
const COMMAND_BUFFER_SIZE: usize = 256;

/// Commands sent from connection handlers to a room actor
#[derive(Debug)]
pub enum RoomCommand {
    /// New connection attached to this room
    Connect {
        conn_id: ConnectionId,
        sender: mpsc::Sender<ServerMessage>,
    },
    /// Transport-level disconnect (no explicit leave)
    Disconnect { conn_id: ConnectionId },
    /// Join the player roster
    Join {
        conn_id: ConnectionId,
        player_name: String,
    },
    /// Start a round
    Start { conn_id: ConnectionId },
    /// In-game action
    Action {
        conn_id: ConnectionId,
        action: GameAction,
    },
    /// Explicit leave (removes the player from the game)
    Leave { conn_id: ConnectionId },
}

/// Roster entry: joins a connection to its stable player identity
#[derive(Debug)]
struct Member {
    conn_id: ConnectionId,
    player_id: PlayerId,
    name: String,
}

/// Per-viewer projection of the game state
///
/// Deep copy where every card in a non-viewer hand becomes the hidden
/// placeholder: count and ordering survive, identity does not.
pub fn sanitize_state_for(state: &GameState, viewer: Option<&PlayerId>) -> GameState {
    let mut view = state.clone();
    for player in view.players.iter_mut() {
        if Some(&player.id) != viewer {
            for card in player.hand.iter_mut() {
                *card = Card::hidden();
            }
        }
    }
    view
}

/// The room actor
///
/// Membership is kept in join order, which fixes the seating order
/// when a game starts. A transport disconnect never removes a member;
/// only an explicit leave does.
pub struct Room {
    id: RoomId,
    config: RoomConfig,
    /// Connection arena: all attached sockets, joined or not
    connections: HashMap<ConnectionId, Connection>,
    /// Player roster in join order
    members: Vec<Member>,
    game: Option<GameState>,
    receiver: mpsc::Receiver<RoomCommand>,
    /// Set once the first connection attaches; the actor exits when
    /// the arena empties afterwards
    opened: bool,
}

impl Room {
    /// Create a room actor reading from the given command channel
    pub fn new(id: RoomId, config: RoomConfig, receiver: mpsc::Receiver<RoomCommand>) -> Self {
        Self {
            id,
            config,
            connections: HashMap::new(),
            members: Vec::new(),
            game: None,
            receiver,
            opened: false,
        }
    }

    /// Spawn a room actor task and return its command sender
    pub fn spawn(id: RoomId, config: RoomConfig) -> mpsc::Sender<RoomCommand> {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER_SIZE);
        let room = Room::new(id, config, rx);
        tokio::spawn(room.run());
        tx
    }

    /// Run the room event loop
    ///
    /// Processes commands until the last connection detaches.
    pub async fn run(mut self) {
        info!("Room {} opened", self.id);

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd).await;
            if self.opened && self.connections.is_empty() {
                break;
            }
        }

        info!("Room {} closed", self.id);
    }

    /// Process a single command to completion
    async fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Connect { conn_id, sender } => {
                self.handle_connect(conn_id, sender).await;
            }
            RoomCommand::Disconnect { conn_id } => {
                self.handle_disconnect(conn_id).await;
            }
            RoomCommand::Join {
                conn_id,
                player_name,
            } => {
                self.handle_join(conn_id, player_name).await;
            }
            RoomCommand::Start { conn_id } => {
                self.handle_start(conn_id).await;
            }
            RoomCommand::Action { conn_id, action } => {
                self.handle_action(conn_id, action).await;
            }
            RoomCommand::Leave { conn_id } => {
                self.handle_leave(conn_id).await;
            }
        }
    }

    fn member_for(&self, conn_id: ConnectionId) -> Option<&Member> {
        self.members.iter().find(|m| m.conn_id == conn_id)
    }

    fn is_playing(&self) -> bool {
        matches!(&self.game, Some(g) if g.phase == Phase::Playing)
    }

    /// Handle new connection attaching to the room
    async fn handle_connect(&mut self, conn_id: ConnectionId, sender: mpsc::Sender<ServerMessage>) {
        self.opened = true;
        let connection = Connection::new(conn_id, sender);

        // Late-connect catch-up: a rejoining viewer gets the current
        // state immediately
        if let Some(game) = &self.game {
            let viewer = self.member_for(conn_id).map(|m| m.player_id.clone());
            let _ = connection
                .send(ServerMessage::GameState {
                    state: sanitize_state_for(game, viewer.as_ref()),
                })
                .await;
        }

        self.connections.insert(conn_id, connection);
        debug!(
            "Connection {} joined room {}. Total: {}",
            conn_id,
            self.id,
            self.connections.len()
        );
    }

    /// Handle a join request
    async fn handle_join(&mut self, conn_id: ConnectionId, player_name: String) {
        let known = self.member_for(conn_id).is_some();

        if !known && self.members.len() >= self.config.max_players {
            self.send_error(conn_id, RoomError::RoomFull).await;
            return;
        }

        if self.is_playing() {
            self.send_error(conn_id, RoomError::GameInProgress).await;
            return;
        }

        let player_id = PlayerId::from_connection(conn_id);
        if let Some(member) = self.members.iter_mut().find(|m| m.conn_id == conn_id) {
            member.name = player_name.clone();
        } else {
            self.members.push(Member {
                conn_id,
                player_id: player_id.clone(),
                name: player_name.clone(),
            });
        }

        info!(
            "Player {} ({}) joined room {}",
            player_name, player_id, self.id
        );

        self.broadcast(ServerMessage::PlayerJoined {
            player: Player::new(player_id, player_name),
        })
        .await;
    }

    /// Handle a start-game request
    async fn handle_start(&mut self, conn_id: ConnectionId) {
        if self.members.len() < self.config.min_players {
            self.send_error(conn_id, RoomError::NotEnoughPlayers(self.config.min_players))
                .await;
            return;
        }

        if self.is_playing() {
            self.send_error(conn_id, RoomError::GameInProgress).await;
            return;
        }

        let players: Vec<Player> = self
            .members
            .iter()
            .map(|m| Player::new(m.player_id.clone(), m.name.clone()))
            .collect();

        let game = match GameState::new_shuffled(players) {
            Ok(game) => game,
            Err(err) => {
                self.send_error(conn_id, err.into()).await;
                return;
            }
        };
        self.game = Some(game);

        info!("Game started in room {}", self.id);

        self.fan_out(|state, viewer| ServerMessage::GameStarted {
            state: sanitize_state_for(state, viewer),
        })
        .await;
        self.broadcast_game_state().await;
    }

    /// Handle an in-game action
    async fn handle_action(&mut self, conn_id: ConnectionId, action: GameAction) {
        let Some(game) = &self.game else {
            self.send_error(conn_id, RoomError::GameNotStarted).await;
            return;
        };

        if game.phase != Phase::Playing {
            self.send_error(conn_id, RoomError::WrongPhase).await;
            return;
        }

        let result = match &action {
            GameAction::PlayCard {
                player_id,
                card,
                chosen_color,
            } => game.play_card(player_id, &card.id, *chosen_color),
            GameAction::DrawCard { player_id } => game.draw_card(player_id),
            GameAction::CallUno { player_id } => game.call_uno(player_id),
            GameAction::ChallengeUno {
                challenger_id,
                target_player_id,
            } => game.challenge_uno(challenger_id, target_player_id),
        };

        let next = match result {
            Ok(next) => next,
            Err(err) => {
                self.send_error(conn_id, err.into()).await;
                return;
            }
        };

        let winner = next.winner.clone();
        self.game = Some(next);

        if let Some(winner_id) = winner {
            let winner_name = self
                .members
                .iter()
                .find(|m| m.player_id == winner_id)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| "Unknown".to_string());

            info!("Game over in room {}: {} wins", self.id, winner_name);

            self.broadcast(ServerMessage::GameOver {
                winner_id,
                winner_name,
            })
            .await;
        }

        self.broadcast_game_state().await;
    }

    /// Handle an explicit leave: membership and game seat both go
    async fn handle_leave(&mut self, conn_id: ConnectionId) {
        let Some(pos) = self.members.iter().position(|m| m.conn_id == conn_id) else {
            // Not a member; just drop the connection handle
            self.connections.remove(&conn_id);
            return;
        };

        let member = self.members.remove(pos);
        info!(
            "Player {} left room {}",
            member.player_id, self.id
        );

        if let Some(game) = &self.game {
            if let Some(next) = game.remove_player(&member.player_id) {
                self.game = Some(next);
            }
        }

        // Dropping the handle closes the write side of the socket
        self.connections.remove(&conn_id);

        self.broadcast(ServerMessage::PlayerLeft {
            player_id: member.player_id,
        })
        .await;
    }

    /// Handle a transport disconnect: the player keeps their seat
    async fn handle_disconnect(&mut self, conn_id: ConnectionId) {
        self.connections.remove(&conn_id);
        debug!(
            "Connection {} left room {}. Total: {}",
            conn_id,
            self.id,
            self.connections.len()
        );

        let Some(member) = self.member_for(conn_id) else {
            return;
        };
        let player_id = member.player_id.clone();

        // Membership survives a disconnect; only the flag changes
        let Some(game) = &mut self.game else {
            return;
        };
        if let Some(player) = game.players.iter_mut().find(|p| p.id == player_id) {
            player.is_connected = false;
        }

        self.broadcast_game_state().await;
        self.broadcast(ServerMessage::PlayerLeft { player_id }).await;
    }

    /// Send an error to one connection only
    async fn send_error(&self, conn_id: ConnectionId, err: RoomError) {
        if let Some(conn) = self.connections.get(&conn_id) {
            let _ = conn.send(err.into()).await;
        }
    }

    /// Send a message to every attached connection
    async fn broadcast(&self, msg: ServerMessage) {
        for conn in self.connections.values() {
            let _ = conn.send(msg.clone()).await;
        }
    }

    /// Send each connection its own sanitized view of the game
    async fn broadcast_game_state(&self) {
        self.fan_out(|state, viewer| ServerMessage::GameState {
            state: sanitize_state_for(state, viewer),
        })
        .await;
    }

    /// Per-viewer fan-out: non-members get the fully redacted view
    async fn fan_out<F>(&self, make: F)
    where
        F: Fn(&GameState, Option<&PlayerId>) -> ServerMessage,
    {
        let Some(game) = &self.game else {
            return;
        };
        for conn in self.connections.values() {
            let viewer = self.member_for(conn.id).map(|m| &m.player_id);
            let _ = conn.send(make(game, viewer)).await;
        }
    }
}
