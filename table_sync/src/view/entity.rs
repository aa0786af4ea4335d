//! Visual entity keys and the descriptors handed to a presenter.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::{
    game::entities::{Card, Chips, PlayerId},
    net::messages::ActionKind,
};

/// Identifies one rendered element. At most one live handle exists per key.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum EntityKey {
    Seat(PlayerId),
    Board,
    Pot,
    Hud,
    ChatLog,
    Result,
    ActionBar,
    ReadyButton,
    ConnectionIndicator,
}

impl EntityKey {
    /// Keys derived purely from snapshots. Everything else is owned by the
    /// dispatcher or the connection.
    pub fn is_table_entity(&self) -> bool {
        matches!(
            self,
            Self::Seat(_) | Self::Board | Self::Pot | Self::Hud | Self::ChatLog | Self::Result
        )
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seat(id) => write!(f, "seat:{id}"),
            Self::Board => write!(f, "board"),
            Self::Pot => write!(f, "pot"),
            Self::Hud => write!(f, "hud"),
            Self::ChatLog => write!(f, "chat"),
            Self::Result => write!(f, "result"),
            Self::ActionBar => write!(f, "action-bar"),
            Self::ReadyButton => write!(f, "ready-button"),
            Self::ConnectionIndicator => write!(f, "connection"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EntityKind {
    Seat,
    Board,
    Pot,
    Hud,
    ChatLog,
    Result,
    ActionBar,
    ReadyButton,
    ConnectionIndicator,
}

/// Seat status line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SeatStatus {
    Normal,
    AllIn,
    Folded,
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Normal => "",
            Self::AllIn => "ALL-IN",
            Self::Folded => "FOLDED",
        };
        write!(f, "{repr}")
    }
}

/// How a single hole card is drawn. A face-down card carries no rank or
/// suit, so a presenter cannot leak it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CardFace {
    Up(Card),
    Down,
}

impl fmt::Display for CardFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up(card) => write!(f, "{card}"),
            Self::Down => write!(f, "??"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Badge {
    Dealer,
    SmallBlind,
    BigBlind,
    Ready,
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Dealer => "D",
            Self::SmallBlind => "SB",
            Self::BigBlind => "BB",
            Self::Ready => "READY",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SeatProps {
    /// Layout slot; 0 is always the local player.
    pub seat: usize,
    pub is_self: bool,
    pub name: String,
    pub chips: Chips,
    pub bet: Chips,
    pub status: SeatStatus,
    pub cards: Vec<CardFace>,
    /// Muted card treatment for players out of the hand.
    pub dimmed: bool,
    /// Whose turn it is.
    pub highlight: bool,
    pub badges: Vec<Badge>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HudProps {
    pub phase: String,
    pub player_count: usize,
    pub my_chips: Option<Chips>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChatLine {
    /// `None` for server announcements.
    pub author: Option<String>,
    pub text: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl fmt::Display for ChatLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(timestamp) = self.timestamp {
            write!(f, "[{}] ", timestamp.format("%H:%M:%S"))?;
        }
        match &self.author {
            Some(author) => write!(f, "{author}: {}", self.text),
            None => write!(f, "* {}", self.text),
        }
    }
}

/// The call/check button as it should read right now.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CallOption {
    pub action: ActionKind,
    pub amount: Chips,
}

impl CallOption {
    pub fn label(&self) -> String {
        match self.action {
            ActionKind::Check => "Check".to_string(),
            _ => format!("Call {}", self.amount),
        }
    }
}

/// Inclusive bounds for a raise target.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RaiseBounds {
    pub min: Chips,
    pub max: Chips,
}

impl RaiseBounds {
    pub fn contains(&self, amount: Chips) -> bool {
        (self.min..=self.max).contains(&amount)
    }
}

impl fmt::Display for RaiseBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActionBarProps {
    pub call: CallOption,
    pub raise: RaiseBounds,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReadyButtonProps {
    pub ready: bool,
}

impl ReadyButtonProps {
    pub fn label(&self) -> &'static str {
        if self.ready { "Cancel" } else { "Ready to Play" }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IndicatorState {
    Connecting,
    Connected,
    Disconnected,
    Failed,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectionProps {
    pub state: IndicatorState,
    pub text: String,
}

/// Everything a presenter needs to draw one entity.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EntityProps {
    Seat(SeatProps),
    Board { cards: Vec<Card> },
    Pot { amount: Chips },
    Hud(HudProps),
    ChatLog { lines: Vec<ChatLine> },
    Result { description: String },
    ActionBar(ActionBarProps),
    ReadyButton(ReadyButtonProps),
    ConnectionIndicator(ConnectionProps),
}

impl EntityProps {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Seat(_) => EntityKind::Seat,
            Self::Board { .. } => EntityKind::Board,
            Self::Pot { .. } => EntityKind::Pot,
            Self::Hud(_) => EntityKind::Hud,
            Self::ChatLog { .. } => EntityKind::ChatLog,
            Self::Result { .. } => EntityKind::Result,
            Self::ActionBar(_) => EntityKind::ActionBar,
            Self::ReadyButton(_) => EntityKind::ReadyButton,
            Self::ConnectionIndicator(_) => EntityKind::ConnectionIndicator,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FeedbackKind {
    Fold,
    Call,
    Raise,
}
