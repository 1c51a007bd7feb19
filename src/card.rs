//! Deck and rules primitives
//!
//! Card representation, construction of the fixed 108-card deck,
//! unbiased shuffling, and the single legality predicate the engine
//! builds on. No game state lives here.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// Total number of cards in a standard UNO deck
pub const DECK_SIZE: usize = 108;

/// Number of cards dealt to each player at game start
pub const HAND_SIZE: usize = 7;

/// Card color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Color {
    /// All four colors in a fixed order (used for deck construction)
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];
}

/// Card face
///
/// Wire form is a string: `"0"`..`"9"` for numerals, otherwise the
/// action name (`"skip"`, `"reverse"`, `"draw2"`, `"wild"`,
/// `"wild_draw4"`), matching the client protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardKind {
    Number(u8),
    Skip,
    Reverse,
    DrawTwo,
    Wild,
    WildDrawFour,
}

impl CardKind {
    /// Whether this kind is a wild (colorless until played)
    pub fn is_wild(&self) -> bool {
        matches!(self, CardKind::Wild | CardKind::WildDrawFour)
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "skip" => Some(CardKind::Skip),
            "reverse" => Some(CardKind::Reverse),
            "draw2" => Some(CardKind::DrawTwo),
            "wild" => Some(CardKind::Wild),
            "wild_draw4" => Some(CardKind::WildDrawFour),
            _ => s
                .parse::<u8>()
                .ok()
                .filter(|n| *n <= 9)
                .map(CardKind::Number),
        }
    }
}

impl Serialize for CardKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CardKind::Number(n) => serializer.serialize_str(&n.to_string()),
            CardKind::Skip => serializer.serialize_str("skip"),
            CardKind::Reverse => serializer.serialize_str("reverse"),
            CardKind::DrawTwo => serializer.serialize_str("draw2"),
            CardKind::Wild => serializer.serialize_str("wild"),
            CardKind::WildDrawFour => serializer.serialize_str("wild_draw4"),
        }
    }
}

impl<'de> Deserialize<'de> for CardKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        CardKind::from_str(&s)
            .ok_or_else(|| de::Error::custom(format!("unknown card type '{}'", s)))
    }
}

/// A single card
///
/// Immutable once created. Wild cards carry `color: None`; the chosen
/// color lives in `GameState::current_color`, not on the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Opaque unique identifier (hand ownership is checked by id)
    pub id: String,
    #[serde(rename = "type")]
    pub kind: CardKind,
    pub color: Option<Color>,
}

impl Card {
    /// Create a colored card with a fresh id
    pub fn new(kind: CardKind, color: Color) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            color: Some(color),
        }
    }

    /// Create a wild card (no color until played) with a fresh id
    pub fn new_wild(kind: CardKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            color: None,
        }
    }

    /// The placeholder sent to non-viewers: preserves hand position and
    /// count, erases identity.
    pub fn hidden() -> Self {
        Self {
            id: "hidden".to_string(),
            kind: CardKind::Number(0),
            color: None,
        }
    }
}

/// Build the fixed 108-card deck and return it uniformly shuffled
///
/// Per color: one 0, two each of 1-9, two skip, two reverse, two draw2.
/// Plus four wild and four wild_draw4.
pub fn build_shuffled_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);

    for color in Color::ALL {
        deck.push(Card::new(CardKind::Number(0), color));
        for n in 1..=9 {
            deck.push(Card::new(CardKind::Number(n), color));
            deck.push(Card::new(CardKind::Number(n), color));
        }
        for kind in [CardKind::Skip, CardKind::Reverse, CardKind::DrawTwo] {
            deck.push(Card::new(kind, color));
            deck.push(Card::new(kind, color));
        }
    }

    for _ in 0..4 {
        deck.push(Card::new_wild(CardKind::Wild));
        deck.push(Card::new_wild(CardKind::WildDrawFour));
    }

    debug_assert_eq!(deck.len(), DECK_SIZE);

    // Fisher-Yates via rand
    deck.shuffle(rng);
    deck
}

/// Legality check: a card may be played on `top_card` under `active_color`
///
/// Wilds are always legal; otherwise the card must match the active
/// color or the top card's kind (numerals compare by value).
pub fn can_play_card(card: &Card, top_card: &Card, active_color: Color) -> bool {
    if card.kind.is_wild() {
        return true;
    }
    if card.color == Some(active_color) {
        return true;
    }
    card.kind == top_card.kind
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn card(kind: CardKind, color: Color) -> Card {
        Card::new(kind, color)
    }

    #[test]
    fn test_deck_size_and_composition() {
        let mut rng = StdRng::seed_from_u64(1);
        let deck = build_shuffled_deck(&mut rng);
        assert_eq!(deck.len(), DECK_SIZE);

        let count = |pred: &dyn Fn(&Card) -> bool| deck.iter().filter(|c| pred(c)).count();

        assert_eq!(count(&|c| c.kind == CardKind::Number(0)), 4);
        for n in 1..=9 {
            assert_eq!(count(&|c| c.kind == CardKind::Number(n)), 8);
        }
        assert_eq!(count(&|c| c.kind == CardKind::Skip), 8);
        assert_eq!(count(&|c| c.kind == CardKind::Reverse), 8);
        assert_eq!(count(&|c| c.kind == CardKind::DrawTwo), 8);
        assert_eq!(count(&|c| c.kind == CardKind::Wild), 4);
        assert_eq!(count(&|c| c.kind == CardKind::WildDrawFour), 4);

        // Wilds carry no color until played
        assert!(deck
            .iter()
            .filter(|c| c.kind.is_wild())
            .all(|c| c.color.is_none()));
    }

    #[test]
    fn test_deck_ids_unique() {
        let mut rng = StdRng::seed_from_u64(2);
        let deck = build_shuffled_deck(&mut rng);
        let mut ids: Vec<&str> = deck.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), DECK_SIZE);
    }

    #[test]
    fn test_can_play_matching_color() {
        let top = card(CardKind::Number(3), Color::Red);
        assert!(can_play_card(
            &card(CardKind::Number(7), Color::Red),
            &top,
            Color::Red
        ));
        assert!(!can_play_card(
            &card(CardKind::Number(7), Color::Blue),
            &top,
            Color::Red
        ));
    }

    #[test]
    fn test_can_play_matching_number() {
        let top = card(CardKind::Number(3), Color::Red);
        assert!(can_play_card(
            &card(CardKind::Number(3), Color::Blue),
            &top,
            Color::Red
        ));
    }

    #[test]
    fn test_can_play_matching_action() {
        let top = card(CardKind::Skip, Color::Green);
        assert!(can_play_card(
            &card(CardKind::Skip, Color::Yellow),
            &top,
            Color::Green
        ));
    }

    #[test]
    fn test_active_color_overrides_top_color() {
        // After a wild, the top card is the wild and the active color rules
        let top = Card::new_wild(CardKind::Wild);
        assert!(can_play_card(
            &card(CardKind::Number(5), Color::Yellow),
            &top,
            Color::Yellow
        ));
        assert!(!can_play_card(
            &card(CardKind::Number(5), Color::Red),
            &top,
            Color::Yellow
        ));
    }

    #[test]
    fn test_wild_always_playable() {
        let top = card(CardKind::Number(9), Color::Blue);
        assert!(can_play_card(&Card::new_wild(CardKind::Wild), &top, Color::Blue));
        assert!(can_play_card(
            &Card::new_wild(CardKind::WildDrawFour),
            &top,
            Color::Blue
        ));
    }

    #[test]
    fn test_card_kind_wire_form() {
        assert_eq!(serde_json::to_string(&CardKind::Number(7)).unwrap(), "\"7\"");
        assert_eq!(
            serde_json::to_string(&CardKind::WildDrawFour).unwrap(),
            "\"wild_draw4\""
        );
        let kind: CardKind = serde_json::from_str("\"draw2\"").unwrap();
        assert_eq!(kind, CardKind::DrawTwo);
        assert!(serde_json::from_str::<CardKind>("\"10\"").is_err());
    }

    #[test]
    fn test_card_json_shape() {
        let c = Card {
            id: "c1".to_string(),
            kind: CardKind::Skip,
            color: Some(Color::Red),
        };
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"type\":\"skip\""));
        assert!(json.contains("\"color\":\"red\""));

        let hidden = Card::hidden();
        let json = serde_json::to_string(&hidden).unwrap();
        assert!(json.contains("\"id\":\"hidden\""));
        assert!(json.contains("\"color\":null"));
    }
}
