use super::entities::Chips;

/// Number of chat entries kept in the rendered chat window.
pub const CHAT_WINDOW: usize = 8;

/// Raise increment used when a snapshot carries no `minRaise`.
pub const DEFAULT_MIN_RAISE: Chips = 20;

/// Seats available around the table, including the local player's own seat.
pub const TABLE_SEATS: usize = 6;

/// Seat index reserved for the local player.
pub const SELF_SEAT: usize = 0;

/// Seats available to everyone other than the local player.
pub const REMOTE_SEATS: usize = TABLE_SEATS - 1;

/// Sender id the server uses for its own chat announcements.
pub const SYSTEM_SENDER: &str = "system";

/// Fallback display name for players without one.
pub const UNKNOWN_PLAYER_NAME: &str = "Player";
