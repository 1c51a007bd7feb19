//! Game engine: state transitions over [`GameState`]
//!
//! Every operation takes `&self` and returns a fresh `GameState` on
//! success. A rejected transition returns `Err` and the caller keeps
//! the previous state untouched; nothing here is committed until the
//! coordinator stores the returned value.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::card::{build_shuffled_deck, can_play_card, Card, CardKind, Color, HAND_SIZE};
use crate::error::GameError;
use crate::types::PlayerId;

/// A seated player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Ordered hand; mutated only by engine transitions
    pub hand: Vec<Card>,
    /// Connectivity flag; a disconnect never removes the player
    pub is_connected: bool,
}

impl Player {
    /// Create a player with an empty hand
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            hand: Vec::new(),
            is_connected: true,
        }
    }
}

/// Game lifecycle phase (one-way: waiting -> playing -> finished)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Waiting,
    Playing,
    Finished,
}

/// Full game state for one room
///
/// Draw and discard piles are stacks: the top of each pile is the end
/// of the `Vec`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Fixed turn order
    pub players: Vec<Player>,
    pub current_player_index: usize,
    /// +1 or -1
    pub direction: i8,
    pub draw_pile: Vec<Card>,
    pub discard_pile: Vec<Card>,
    pub current_color: Color,
    /// Players with a live UNO call
    pub called_uno: HashSet<PlayerId>,
    pub phase: Phase,
    pub winner: Option<PlayerId>,
}

impl GameState {
    /// Initialize a game: shuffle, deal 7 each, flip the first discard
    ///
    /// The initial discard is the deck's top non-wild card; wilds are
    /// shuffled back and redrawn. An action card as first discard
    /// applies no effect at setup: the first seat simply plays.
    pub fn new<R: Rng + ?Sized>(mut players: Vec<Player>, rng: &mut R) -> Result<Self, GameError> {
        if players.len() < 2 {
            return Err(GameError::NotEnoughPlayers);
        }

        let mut draw_pile = build_shuffled_deck(rng);

        for _ in 0..HAND_SIZE {
            for player in players.iter_mut() {
                let card = draw_pile.pop().ok_or(GameError::DeckExhausted)?;
                player.hand.push(card);
            }
        }

        // The redraw loop below needs a non-wild left to flip
        if draw_pile.iter().all(|c| c.kind.is_wild()) {
            return Err(GameError::DeckExhausted);
        }

        let first_discard = loop {
            let card = draw_pile.pop().ok_or(GameError::DeckExhausted)?;
            if card.kind.is_wild() {
                draw_pile.push(card);
                draw_pile.shuffle(rng);
            } else {
                break card;
            }
        };

        let current_color = first_discard.color.ok_or(GameError::DeckExhausted)?;

        Ok(Self {
            players,
            current_player_index: 0,
            direction: 1,
            draw_pile,
            discard_pile: vec![first_discard],
            current_color,
            called_uno: HashSet::new(),
            phase: Phase::Playing,
            winner: None,
        })
    }

    /// Initialize with a thread-local RNG
    pub fn new_shuffled(players: Vec<Player>) -> Result<Self, GameError> {
        Self::new(players, &mut rand::thread_rng())
    }

    /// Top of the discard pile
    pub fn top_card(&self) -> Option<&Card> {
        self.discard_pile.last()
    }

    /// The player whose turn it is
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    fn player_index(&self, player_id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == player_id)
    }

    /// Seat index `steps` positions away in the current direction
    fn seat_offset(&self, steps: i32) -> usize {
        let len = self.players.len() as i32;
        (self.current_player_index as i32 + steps * self.direction as i32).rem_euclid(len) as usize
    }

    fn advance_turn(&mut self, steps: i32) {
        self.current_player_index = self.seat_offset(steps);
    }

    /// Pop one card from the draw pile, refilling it from the discard
    /// pile (minus its top card) when empty.
    fn draw_from_pile(&mut self) -> Result<Card, GameError> {
        if self.draw_pile.is_empty() && self.discard_pile.len() > 1 {
            let top = self.discard_pile.pop().ok_or(GameError::DeckExhausted)?;
            self.draw_pile = std::mem::take(&mut self.discard_pile);
            self.draw_pile.shuffle(&mut rand::thread_rng());
            self.discard_pile.push(top);
        }
        self.draw_pile.pop().ok_or(GameError::DeckExhausted)
    }

    /// Deal `count` penalty/effect cards to the seat at `index`
    fn give_cards(&mut self, index: usize, count: usize) -> Result<(), GameError> {
        for _ in 0..count {
            let card = self.draw_from_pile()?;
            self.players[index].hand.push(card);
        }
        // Back above the UNO threshold: any live call is stale
        if self.players[index].hand.len() > 2 {
            let id = self.players[index].id.clone();
            self.called_uno.remove(&id);
        }
        Ok(())
    }

    /// Play a card from the acting player's hand
    ///
    /// Fail order: NotYourTurn, CardNotOwned, IllegalCard,
    /// MissingColorChoice. Legality is judged on the owned hand card
    /// looked up by id, never on client-supplied card fields.
    pub fn play_card(
        &self,
        player_id: &PlayerId,
        card_id: &str,
        chosen_color: Option<Color>,
    ) -> Result<GameState, GameError> {
        let current = self.current_player().ok_or(GameError::NotYourTurn)?;
        if &current.id != player_id {
            return Err(GameError::NotYourTurn);
        }

        let seat = self.current_player_index;
        let hand_index = current
            .hand
            .iter()
            .position(|c| c.id == card_id)
            .ok_or(GameError::CardNotOwned)?;
        let card = current.hand[hand_index].clone();

        let top = self.top_card().ok_or(GameError::IllegalCard)?;
        if !can_play_card(&card, top, self.current_color) {
            return Err(GameError::IllegalCard);
        }

        if card.kind.is_wild() && chosen_color.is_none() {
            return Err(GameError::MissingColorChoice);
        }

        let mut next = self.clone();
        next.players[seat].hand.remove(hand_index);
        next.discard_pile.push(card.clone());

        next.current_color = match (chosen_color, card.color) {
            (Some(chosen), _) if card.kind.is_wild() => chosen,
            (_, Some(color)) => color,
            // Unreachable: non-wilds always carry a color
            _ => next.current_color,
        };

        // A UNO call only survives the play it applied to
        if next.players[seat].hand.len() != 1 {
            next.called_uno.remove(player_id);
        }

        if next.players[seat].hand.is_empty() {
            next.phase = Phase::Finished;
            next.winner = Some(player_id.clone());
            return Ok(next);
        }

        match card.kind {
            CardKind::Number(_) | CardKind::Wild => next.advance_turn(1),
            CardKind::Skip => next.advance_turn(2),
            CardKind::Reverse => {
                if next.players.len() == 2 {
                    // Two-player reverse acts as a skip
                    next.advance_turn(2);
                } else {
                    next.direction = -next.direction;
                    next.advance_turn(1);
                }
            }
            CardKind::DrawTwo => {
                let target = next.seat_offset(1);
                next.give_cards(target, 2)?;
                next.advance_turn(2);
            }
            CardKind::WildDrawFour => {
                let target = next.seat_offset(1);
                next.give_cards(target, 4)?;
                next.advance_turn(2);
            }
        }

        Ok(next)
    }

    /// Draw a single card; drawing always ends the turn
    pub fn draw_card(&self, player_id: &PlayerId) -> Result<GameState, GameError> {
        let current = self.current_player().ok_or(GameError::NotYourTurn)?;
        if &current.id != player_id {
            return Err(GameError::NotYourTurn);
        }

        let seat = self.current_player_index;
        let mut next = self.clone();
        let card = next.draw_from_pile()?;
        next.players[seat].hand.push(card);

        if next.players[seat].hand.len() > 2 {
            next.called_uno.remove(player_id);
        }

        next.advance_turn(1);
        Ok(next)
    }

    /// Declare UNO; only valid at one or two cards
    pub fn call_uno(&self, player_id: &PlayerId) -> Result<GameState, GameError> {
        let index = self.player_index(player_id).ok_or(GameError::NotEligible)?;
        let hand_len = self.players[index].hand.len();
        if hand_len != 1 && hand_len != 2 {
            return Err(GameError::NotEligible);
        }

        let mut next = self.clone();
        next.called_uno.insert(player_id.clone());
        Ok(next)
    }

    /// Challenge a missed UNO call
    ///
    /// Valid iff the target holds exactly one card and has not called;
    /// the target then draws two penalty cards.
    pub fn challenge_uno(
        &self,
        challenger_id: &PlayerId,
        target_player_id: &PlayerId,
    ) -> Result<GameState, GameError> {
        if self.player_index(challenger_id).is_none() {
            return Err(GameError::InvalidChallenge);
        }
        let target = self
            .player_index(target_player_id)
            .ok_or(GameError::InvalidChallenge)?;

        if self.players[target].hand.len() != 1 || self.called_uno.contains(target_player_id) {
            return Err(GameError::InvalidChallenge);
        }

        let mut next = self.clone();
        next.give_cards(target, 2)?;
        Ok(next)
    }

    /// Remove a player who left mid-game
    ///
    /// The leaver's hand is folded back into the bottom of the draw
    /// pile so the deck stays whole. Seats after the leaver shift down;
    /// if the leaver held the turn it passes to the next still-seated
    /// player in the current direction. Returns `None` for an unknown
    /// player.
    pub fn remove_player(&self, player_id: &PlayerId) -> Option<GameState> {
        let index = self.player_index(player_id)?;

        let mut next = self.clone();
        let removed = next.players.remove(index);
        next.called_uno.remove(player_id);

        // Bottom of the pile is the front of the Vec
        let mut pile = removed.hand;
        pile.append(&mut next.draw_pile);
        next.draw_pile = pile;

        if next.players.is_empty() {
            next.current_player_index = 0;
            return Some(next);
        }

        let len = next.players.len();
        let cur = next.current_player_index;
        next.current_player_index = if index < cur {
            cur - 1
        } else if index == cur && next.direction < 0 {
            (cur as i32 - 1).rem_euclid(len as i32) as usize
        } else {
            // Leaver was the current seat with direction +1: the next
            // player in original order now occupies this index. Also
            // covers seats after the leaver, which do not shift.
            cur % len
        };

        Some(next)
    }

    /// Total cards across both piles and every hand
    pub fn total_cards(&self) -> usize {
        self.draw_pile.len()
            + self.discard_pile.len()
            + self.players.iter().map(|p| p.hand.len()).sum::<usize>()
    }
}
