//! Seat layout.
//!
//! The local player always sits in [`SELF_SEAT`]. Everyone else is placed
//! by their position in `playerOrder` with the local player removed, so the
//! layout only moves when the server reorders the table. Players missing
//! from `playerOrder` follow in id order.

use std::collections::{BTreeMap, BTreeSet};

use crate::game::{
    constants::{REMOTE_SEATS, SELF_SEAT},
    entities::{PlayerId, Snapshot},
};

/// Seat index for every player in `snapshot`, connected or not.
///
/// Disconnected players keep their slot in the ordering so that a drop does
/// not shuffle everyone behind them. Remote seats wrap modulo
/// [`REMOTE_SEATS`], so tables larger than the layout share slots.
pub fn assign_seats(snapshot: &Snapshot, me: Option<&PlayerId>) -> BTreeMap<PlayerId, usize> {
    let mut seats = BTreeMap::new();
    if let Some(me) = me {
        if snapshot.players.contains_key(me) {
            seats.insert(me.clone(), SELF_SEAT);
        }
    }

    let mut seen = BTreeSet::new();
    let ordered = snapshot
        .player_order
        .iter()
        .chain(snapshot.players.keys())
        .filter(|id| Some(*id) != me && snapshot.players.contains_key(*id))
        .filter(|id| seen.insert(*id));

    for (position, id) in ordered.enumerate() {
        seats.insert(id.clone(), remote_seat(position));
    }
    seats
}

/// Seat for the `position`-th remote player.
pub fn remote_seat(position: usize) -> usize {
    SELF_SEAT + 1 + position % REMOTE_SEATS
}
