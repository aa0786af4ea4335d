/// Property-based tests for reconciliation and reconnect backoff
///
/// Snapshots are generated with arbitrary player sets, turn and dealer
/// indices (including out-of-range and negative ones), phases and chat
/// histories.
use proptest::prelude::*;
use std::{collections::BTreeSet, time::Duration};
use table_sync::{
    Card, GamePhase, PlayerId, PlayerView, ReconcilerContext, ReconnectPolicy, Snapshot,
    entities::{ChatMessage, Rank, Suit},
    reconcile, render_set,
    view::{
        entity::{CardFace, EntityKey, EntityProps},
        presenter::RecordingPresenter,
        reconciler::RenderOp,
        seats::assign_seats,
    },
};

fn card_strategy() -> impl Strategy<Value = Card> {
    (0usize..13, 0usize..4).prop_map(|(rank, suit)| {
        let ranks = [
            Rank::Two,
            Rank::Three,
            Rank::Four,
            Rank::Five,
            Rank::Six,
            Rank::Seven,
            Rank::Eight,
            Rank::Nine,
            Rank::Ten,
            Rank::Jack,
            Rank::Queen,
            Rank::King,
            Rank::Ace,
        ];
        let suits = [Suit::Spade, Suit::Heart, Suit::Diamond, Suit::Club];
        Card::new(ranks[rank], suits[suit])
    })
}

fn phase_strategy() -> impl Strategy<Value = GamePhase> {
    prop_oneof![
        Just(GamePhase::Waiting),
        Just(GamePhase::PreFlop),
        Just(GamePhase::Flop),
        Just(GamePhase::Turn),
        Just(GamePhase::River),
        Just(GamePhase::Showdown),
    ]
}

fn player_strategy() -> impl Strategy<Value = (u64, u64, bool, bool, bool, Vec<Card>)> {
    (
        0u64..1000,
        0u64..200,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        prop::collection::vec(card_strategy(), 0..=2),
    )
}

// Up to 9 players drawn from a fixed id pool so consecutive snapshots share
// some keys and differ in others.
fn snapshot_strategy() -> impl Strategy<Value = Snapshot> {
    let ids = prop::sample::subsequence((0..9).map(|i| format!("p{i}")).collect::<Vec<_>>(), 0..=9);
    ids.prop_flat_map(|ids| {
        (
            Just(ids.clone()),
            prop::collection::vec(player_strategy(), ids.len()),
            Just(ids).prop_shuffle(),
            prop::collection::vec(card_strategy(), 0..=5),
            phase_strategy(),
            any::<bool>(),
            prop::option::of(-2i64..10),
            prop::option::of(-2i64..10),
            0u64..500,
            prop::collection::vec(("p[0-9]|system", "[a-z ]{0,12}"), 0..12),
            prop::option::of("[A-Za-z ]{0,20}"),
        )
    })
    .prop_map(
        |(ids, players, order, board, phase, started, turn, dealer, pot, chat, winner)| Snapshot {
            pot,
            players: ids
                .into_iter()
                .zip(players)
                .map(|(id, (chips, bet, is_connected, is_in_hand, is_all_in, hand))| {
                    let id = PlayerId::new(id);
                    let player = PlayerView {
                        id: id.clone(),
                        name: id.to_string(),
                        chips,
                        bet,
                        is_connected,
                        is_in_hand,
                        is_all_in,
                        hand,
                    };
                    (id, player)
                })
                .collect(),
            community_cards: board,
            game_phase: phase,
            game_started: started,
            player_order: order.into_iter().map(PlayerId::new).collect(),
            current_turn_index: turn,
            dealer_index: dealer,
            last_bet: 0,
            min_raise: None,
            player_ready: Default::default(),
            chat_messages: chat
                .into_iter()
                .map(|(player_id, message)| ChatMessage {
                    player_id: PlayerId::new(player_id),
                    message,
                    timestamp: None,
                })
                .collect(),
            winning_hand_desc: winner,
        },
    )
}

fn viewer_strategy() -> impl Strategy<Value = Option<PlayerId>> {
    prop::option::of((0..9).prop_map(|i| PlayerId::new(format!("p{i}"))))
}

proptest! {
    #[test]
    fn test_reapplying_a_snapshot_is_a_noop(snapshot in snapshot_strategy(), viewer in viewer_strategy()) {
        prop_assert!(reconcile(Some(&snapshot), &snapshot, viewer.as_ref()).is_empty());

        let mut presenter = RecordingPresenter::new();
        let mut context = ReconcilerContext::new();
        context.apply(snapshot.clone(), viewer.as_ref(), &mut presenter);
        presenter.take();
        prop_assert!(context.apply(snapshot, viewer.as_ref(), &mut presenter).is_empty());
        prop_assert!(presenter.calls.is_empty());
    }

    #[test]
    fn test_vanished_keys_destroyed_exactly_once(
        first in snapshot_strategy(),
        second in snapshot_strategy(),
        viewer in viewer_strategy(),
    ) {
        let before = render_set(&first, viewer.as_ref());
        let after = render_set(&second, viewer.as_ref());
        let plan = reconcile(Some(&first), &second, viewer.as_ref());

        let destroyed: Vec<_> = plan.destroyed().cloned().collect();
        let unique: BTreeSet<_> = destroyed.iter().cloned().collect();
        prop_assert_eq!(destroyed.len(), unique.len());

        let expected: BTreeSet<_> = before
            .keys()
            .filter(|key| !after.contains_key(*key))
            .cloned()
            .collect();
        prop_assert_eq!(unique, expected);

        // Destroys come first.
        let first_upsert = plan.ops.iter().position(|op| matches!(op, RenderOp::Upsert { .. }));
        if let Some(first_upsert) = first_upsert {
            let all_upserts_after = plan.ops[first_upsert..]
                .iter()
                .all(|op| matches!(op, RenderOp::Upsert { .. }));
            prop_assert!(all_upserts_after);
        }
    }

    #[test]
    fn test_applying_plan_yields_render_set(
        first in snapshot_strategy(),
        second in snapshot_strategy(),
        viewer in viewer_strategy(),
    ) {
        let mut presenter = RecordingPresenter::new();
        let mut context = ReconcilerContext::new();
        context.apply(first, viewer.as_ref(), &mut presenter);
        context.apply(second.clone(), viewer.as_ref(), &mut presenter);

        let shown = context.registry().rendered(EntityKey::is_table_entity);
        prop_assert_eq!(shown, render_set(&second, viewer.as_ref()));
    }

    #[test]
    fn test_hidden_cards_never_leak(snapshot in snapshot_strategy(), viewer in viewer_strategy()) {
        for (key, props) in render_set(&snapshot, viewer.as_ref()) {
            let EntityProps::Seat(seat) = props else { continue };
            let EntityKey::Seat(id) = key else { continue };
            if Some(&id) != viewer.as_ref() && snapshot.game_phase != GamePhase::Showdown {
                prop_assert!(seat.cards.iter().all(|card| *card == CardFace::Down));
            }
        }
    }

    #[test]
    fn test_only_connected_players_seated(snapshot in snapshot_strategy(), viewer in viewer_strategy()) {
        let set = render_set(&snapshot, viewer.as_ref());
        for player in snapshot.players.values() {
            let seated = set.contains_key(&EntityKey::Seat(player.id.clone()));
            prop_assert_eq!(seated, player.is_connected);
        }
    }

    #[test]
    fn test_no_highlight_before_start(mut snapshot in snapshot_strategy(), viewer in viewer_strategy()) {
        snapshot.game_started = false;
        for props in render_set(&snapshot, viewer.as_ref()).values() {
            if let EntityProps::Seat(seat) = props {
                prop_assert!(!seat.highlight);
            }
        }
    }

    #[test]
    fn test_seat_assignment_ignores_map_order(snapshot in snapshot_strategy(), viewer in viewer_strategy()) {
        let seats = assign_seats(&snapshot, viewer.as_ref());

        // Rebuild the player map in reverse insertion order.
        let mut reversed = snapshot.clone();
        reversed.players = snapshot
            .players
            .iter()
            .rev()
            .map(|(id, p)| (id.clone(), p.clone()))
            .collect();
        prop_assert_eq!(&seats, &assign_seats(&reversed, viewer.as_ref()));

        for (id, seat) in &seats {
            if Some(id) == viewer.as_ref() {
                prop_assert_eq!(*seat, 0);
            } else {
                prop_assert!((1..6).contains(seat));
            }
        }
    }

    #[test]
    fn test_backoff_is_capped_and_monotonic(
        base in 1u64..5_000,
        cap in 1u64..60_000,
        attempts in 0u32..40,
    ) {
        let policy = ReconnectPolicy {
            base_delay: Duration::from_millis(base),
            max_delay: Duration::from_millis(cap.max(base)),
            max_attempts: attempts,
        };
        let delays: Vec<_> = policy.schedule().collect();
        prop_assert_eq!(delays.len(), attempts as usize);
        prop_assert!(delays.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(delays.iter().all(|d| *d <= policy.max_delay));
        if let Some(first) = delays.first() {
            prop_assert_eq!(*first, policy.base_delay);
        }
    }
}
