//! Snapshot to entity reconciliation.
//!
//! [`render_set`] maps one snapshot to the complete set of table entities it
//! should produce. [`reconcile`] diffs two of those sets into a
//! [`RenderPlan`]. Both are pure; [`ReconcilerContext`] is what carries the
//! previously applied snapshot and the live handles between calls.

use log::debug;
use std::collections::BTreeMap;

use super::{
    entity::{Badge, CardFace, ChatLine, EntityKey, EntityProps, HudProps, SeatProps, SeatStatus},
    presenter::Presenter,
    registry::EntityRegistry,
    seats::assign_seats,
};
use crate::game::{
    constants::{CHAT_WINDOW, SELF_SEAT, UNKNOWN_PLAYER_NAME},
    entities::{PlayerId, PlayerView, Snapshot},
};

pub type RenderSet = BTreeMap<EntityKey, EntityProps>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RenderOp {
    Upsert { key: EntityKey, props: EntityProps },
    Destroy { key: EntityKey },
}

/// Ordered entity operations. Destroys always come before upserts.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RenderPlan {
    pub ops: Vec<RenderOp>,
}

impl RenderPlan {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn destroyed(&self) -> impl Iterator<Item = &EntityKey> {
        self.ops.iter().filter_map(|op| match op {
            RenderOp::Destroy { key } => Some(key),
            RenderOp::Upsert { .. } => None,
        })
    }

    pub fn upserted(&self) -> impl Iterator<Item = (&EntityKey, &EntityProps)> {
        self.ops.iter().filter_map(|op| match op {
            RenderOp::Upsert { key, props } => Some((key, props)),
            RenderOp::Destroy { .. } => None,
        })
    }

    /// Carry out the plan against `registry`.
    pub fn apply<P: Presenter>(self, registry: &mut EntityRegistry<P::Handle>, presenter: &mut P) {
        for op in self.ops {
            match op {
                RenderOp::Destroy { key } => {
                    registry.destroy(presenter, &key);
                }
                RenderOp::Upsert { key, props } => {
                    registry.upsert(presenter, key, props);
                }
            }
        }
    }
}

/// Every table entity `snapshot` should produce for `viewer`.
pub fn render_set(snapshot: &Snapshot, viewer: Option<&PlayerId>) -> RenderSet {
    let mut set = RenderSet::new();

    let seats = assign_seats(snapshot, viewer);
    let badges = seat_badges(snapshot);
    let turn = snapshot.current_turn_player();
    for player in snapshot.players.values().filter(|p| p.is_connected) {
        let Some(seat) = seats.get(&player.id).copied() else {
            continue;
        };
        let is_self = viewer == Some(&player.id);
        let props = SeatProps {
            seat,
            is_self,
            name: player.display_name().to_string(),
            chips: player.chips,
            bet: player.bet,
            status: seat_status(snapshot, player),
            cards: card_faces(snapshot, player, is_self),
            dimmed: !player.is_in_hand,
            highlight: turn == Some(&player.id),
            badges: badges.get(&player.id).cloned().unwrap_or_default(),
        };
        debug_assert!(!is_self || seat == SELF_SEAT);
        set.insert(EntityKey::Seat(player.id.clone()), EntityProps::Seat(props));
    }

    if !snapshot.community_cards.is_empty() {
        set.insert(
            EntityKey::Board,
            EntityProps::Board {
                cards: snapshot.community_cards.clone(),
            },
        );
    }

    set.insert(
        EntityKey::Pot,
        EntityProps::Pot {
            amount: snapshot.pot,
        },
    );

    set.insert(
        EntityKey::Hud,
        EntityProps::Hud(HudProps {
            phase: snapshot.game_phase.label().to_string(),
            player_count: snapshot.players.len(),
            my_chips: viewer
                .and_then(|id| snapshot.player(id))
                .map(|me| me.chips),
        }),
    );

    if !snapshot.chat_messages.is_empty() {
        set.insert(
            EntityKey::ChatLog,
            EntityProps::ChatLog {
                lines: chat_lines(snapshot),
            },
        );
    }

    if snapshot.is_showdown() {
        if let Some(description) = snapshot
            .winning_hand_desc
            .as_ref()
            .filter(|desc| !desc.is_empty())
        {
            set.insert(
                EntityKey::Result,
                EntityProps::Result {
                    description: description.clone(),
                },
            );
        }
    }

    set
}

/// Operations turning what `previous` shows into what `next` shows.
pub fn diff(previous: &RenderSet, next: &RenderSet) -> RenderPlan {
    let destroys = previous
        .keys()
        .filter(|key| !next.contains_key(*key))
        .map(|key| RenderOp::Destroy { key: key.clone() });
    let upserts = next
        .iter()
        .filter(|(key, props)| previous.get(*key) != Some(*props))
        .map(|(key, props)| RenderOp::Upsert {
            key: key.clone(),
            props: props.clone(),
        });
    RenderPlan {
        ops: destroys.chain(upserts).collect(),
    }
}

/// Plan for moving from `previous` (nothing rendered when `None`) to
/// `next`, both seen by `viewer`.
pub fn reconcile(
    previous: Option<&Snapshot>,
    next: &Snapshot,
    viewer: Option<&PlayerId>,
) -> RenderPlan {
    let before = previous
        .map(|snapshot| render_set(snapshot, viewer))
        .unwrap_or_default();
    diff(&before, &render_set(next, viewer))
}

fn seat_status(snapshot: &Snapshot, player: &PlayerView) -> SeatStatus {
    if player.is_all_in {
        SeatStatus::AllIn
    } else if !player.is_in_hand && snapshot.game_started {
        SeatStatus::Folded
    } else {
        SeatStatus::Normal
    }
}

fn card_faces(snapshot: &Snapshot, player: &PlayerView, is_self: bool) -> Vec<CardFace> {
    let face_up = is_self || snapshot.is_showdown();
    player
        .hand
        .iter()
        .map(|card| {
            if face_up {
                CardFace::Up(*card)
            } else {
                CardFace::Down
            }
        })
        .collect()
}

fn seat_badges(snapshot: &Snapshot) -> BTreeMap<PlayerId, Vec<Badge>> {
    let mut badges: BTreeMap<PlayerId, Vec<Badge>> = BTreeMap::new();
    if snapshot.game_started {
        let Some(dealer) = snapshot.dealer_position() else {
            return badges;
        };
        let order = &snapshot.player_order;
        let roles = [Badge::Dealer, Badge::SmallBlind, Badge::BigBlind];
        for (offset, badge) in roles.into_iter().enumerate() {
            let id = &order[(dealer + offset) % order.len()];
            badges.entry(id.clone()).or_default().push(badge);
        }
    } else {
        for (id, ready) in &snapshot.player_ready {
            if *ready {
                badges.entry(id.clone()).or_default().push(Badge::Ready);
            }
        }
    }
    badges
}

fn chat_lines(snapshot: &Snapshot) -> Vec<ChatLine> {
    let skip = snapshot.chat_messages.len().saturating_sub(CHAT_WINDOW);
    snapshot.chat_messages[skip..]
        .iter()
        .map(|msg| ChatLine {
            author: if msg.is_system() {
                None
            } else {
                Some(
                    snapshot
                        .player(&msg.player_id)
                        .map(|p| p.display_name())
                        .unwrap_or(UNKNOWN_PLAYER_NAME)
                        .to_string(),
                )
            },
            text: msg.message.clone(),
            timestamp: msg.timestamp,
        })
        .collect()
}

/// State carried between snapshots: the last snapshot applied and the
/// handles it produced.
pub struct ReconcilerContext<H> {
    previous: Option<Snapshot>,
    registry: EntityRegistry<H>,
}

impl<H> Default for ReconcilerContext<H> {
    fn default() -> Self {
        Self {
            previous: None,
            registry: EntityRegistry::new(),
        }
    }
}

impl<H> ReconcilerContext<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    pub fn registry(&self) -> &EntityRegistry<H> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry<H> {
        &mut self.registry
    }

    /// Apply `next` as seen by `viewer` and make it the new basis.
    ///
    /// The diff runs against what the registry actually shows rather than
    /// against a re-render of the previous snapshot, so a changed viewer
    /// is picked up and applying the same snapshot twice does nothing.
    pub fn apply<P>(&mut self, next: Snapshot, viewer: Option<&PlayerId>, presenter: &mut P) -> RenderPlan
    where
        P: Presenter<Handle = H>,
    {
        let shown = self.registry.rendered(EntityKey::is_table_entity);
        let plan = diff(&shown, &render_set(&next, viewer));
        if !plan.is_empty() {
            debug!("applying {} entity op(s)", plan.len());
        }
        plan.clone().apply(&mut self.registry, presenter);
        self.previous = Some(next);
        plan
    }

    /// Re-apply the current snapshot, for instance after the viewer changed.
    pub fn refresh<P>(&mut self, viewer: Option<&PlayerId>, presenter: &mut P) -> RenderPlan
    where
        P: Presenter<Handle = H>,
    {
        match self.previous.take() {
            Some(snapshot) => self.apply(snapshot, viewer, presenter),
            None => RenderPlan::default(),
        }
    }
}
