use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self},
};

use super::constants;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    #[serde(rename = "♠")]
    Spade,
    #[serde(rename = "♥")]
    Heart,
    #[serde(rename = "♦")]
    Diamond,
    #[serde(rename = "♣")]
    Club,
}

impl Suit {
    pub fn is_red(&self) -> bool {
        matches!(self, Self::Heart | Self::Diamond)
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Rank {
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "A")]
    Ace,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
            Self::Ace => "A",
        };
        write!(f, "{repr}")
    }
}

/// A card as the server describes it. Cards are plain values and double as
/// the lookup key for whatever artwork a presenter uses.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

/// Type alias for chip amounts. Stacks and bets are never negative.
pub type Chips = u64;

/// Opaque player identity assigned by the server.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id is the sentinel the server uses for its own chat
    /// messages.
    pub fn is_system(&self) -> bool {
        self.0 == constants::SYSTEM_SENDER
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum GamePhase {
    #[default]
    #[serde(rename = "waiting")]
    Waiting,
    #[serde(rename = "pre-flop")]
    PreFlop,
    #[serde(rename = "flop")]
    Flop,
    #[serde(rename = "turn")]
    Turn,
    #[serde(rename = "river")]
    River,
    #[serde(rename = "showdown")]
    Showdown,
}

impl GamePhase {
    /// Human readable label for status displays.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Waiting => "Waiting for Players",
            Self::PreFlop => "Pre-Flop",
            Self::Flop => "Flop",
            Self::Turn => "Turn",
            Self::River => "River",
            Self::Showdown => "Showdown",
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A player as seen from this client. Other players' `hand` may be
/// populated by the server; whether it is shown is decided by the
/// reconciler, not here.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    #[serde(deserialize_with = "non_negative")]
    pub chips: Chips,
    #[serde(deserialize_with = "non_negative")]
    pub bet: Chips,
    pub is_connected: bool,
    pub is_in_hand: bool,
    pub is_all_in: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub hand: Vec<Card>,
}

impl PlayerView {
    /// Name to show for this player; the server may send an empty one.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            constants::UNKNOWN_PLAYER_NAME
        } else {
            &self.name
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub player_id: PlayerId,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn is_system(&self) -> bool {
        self.player_id.is_system()
    }
}

/// Full authoritative table state pushed by the server. Each snapshot
/// supersedes the previous one entirely.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    #[serde(deserialize_with = "non_negative")]
    pub pot: Chips,
    #[serde(deserialize_with = "null_as_default")]
    pub players: BTreeMap<PlayerId, PlayerView>,
    #[serde(deserialize_with = "null_as_default")]
    pub community_cards: Vec<Card>,
    pub game_phase: GamePhase,
    pub game_started: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub player_order: Vec<PlayerId>,
    pub current_turn_index: Option<i64>,
    pub dealer_index: Option<i64>,
    #[serde(deserialize_with = "non_negative")]
    pub last_bet: Chips,
    pub min_raise: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub player_ready: BTreeMap<PlayerId, bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub chat_messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winning_hand_desc: Option<String>,
}

impl Snapshot {
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerView> {
        self.players.get(id)
    }

    /// Resolve a possibly negative or out-of-range index into `player_order`.
    pub fn order_at(&self, idx: Option<i64>) -> Option<&PlayerId> {
        idx.and_then(|idx| usize::try_from(idx).ok())
            .and_then(|idx| self.player_order.get(idx))
    }

    /// The player whose turn it is, if the game is running and the
    /// turn index points somewhere valid.
    pub fn current_turn_player(&self) -> Option<&PlayerId> {
        if !self.game_started {
            return None;
        }
        self.order_at(self.current_turn_index)
    }

    /// Position of the dealer in `player_order`, if any.
    pub fn dealer_position(&self) -> Option<usize> {
        self.dealer_index
            .and_then(|idx| usize::try_from(idx).ok())
            .filter(|idx| *idx < self.player_order.len())
    }

    /// Minimum raise increment. The server uses `0` and absence
    /// interchangeably for "use the default".
    pub fn min_raise_increment(&self) -> Chips {
        match self.min_raise {
            Some(increment) if increment > 0 => increment as Chips,
            _ => constants::DEFAULT_MIN_RAISE,
        }
    }

    pub fn is_ready(&self, id: &PlayerId) -> bool {
        self.player_ready.get(id).copied().unwrap_or(false)
    }

    pub fn is_showdown(&self) -> bool {
        self.game_phase == GamePhase::Showdown
    }
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Chip amounts come from a server that uses signed integers. Anything below
/// zero is clamped rather than rejecting the whole snapshot.
fn non_negative<'de, D>(deserializer: D) -> Result<Chips, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<i64>::deserialize(deserializer)?.unwrap_or(0);
    Ok(value.max(0) as Chips)
}
