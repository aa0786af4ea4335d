//! Turn gating and outbound action construction.

use log::debug;
use thiserror::Error;

use super::entity::{ActionBarProps, CallOption, RaiseBounds, ReadyButtonProps};
use crate::{
    game::entities::{Chips, PlayerId, Snapshot},
    net::messages::{ActionKind, ClientFrame, Outbound, PlayerAction},
};

/// A user request rejected before anything reached the network.
#[derive(Debug, Eq, Error, PartialEq)]
pub enum ActionError {
    #[error("Please enter your name!")]
    EmptyName,
    #[error("Please enter your name first!")]
    NameRequired,
    #[error("Message cannot be empty!")]
    EmptyMessage,
    #[error("Game already in progress!")]
    GameInProgress,
    #[error("It's not your turn!")]
    NotYourTurn,
    #[error("Invalid raise amount!")]
    InvalidRaise { amount: Chips, bounds: RaiseBounds },
}

impl ActionError {
    /// Whether the user mistyped something, as opposed to acting at the
    /// wrong time.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyName | Self::EmptyMessage | Self::InvalidRaise { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ActionError>;

/// Whether `me` may act in `snapshot`.
pub fn is_my_turn(snapshot: &Snapshot, me: &PlayerId) -> bool {
    snapshot.current_turn_player() == Some(me)
}

/// The check/call choice for `me`, or `None` if `me` is not at the table.
pub fn call_option(snapshot: &Snapshot, me: &PlayerId) -> Option<CallOption> {
    let player = snapshot.player(me)?;
    let option = if player.bet >= snapshot.last_bet {
        CallOption {
            action: ActionKind::Check,
            amount: 0,
        }
    } else {
        CallOption {
            action: ActionKind::Call,
            amount: snapshot.last_bet - player.bet,
        }
    };
    Some(option)
}

/// Inclusive raise target range for `me`. The range is empty (min above
/// max) when the stack cannot cover a minimum raise.
pub fn raise_bounds(snapshot: &Snapshot, me: &PlayerId) -> Option<RaiseBounds> {
    let player = snapshot.player(me)?;
    Some(RaiseBounds {
        min: snapshot
            .last_bet
            .saturating_add(snapshot.min_raise_increment()),
        max: player.chips.saturating_add(player.bet),
    })
}

/// Local action state: optimistic suppression and the ready toggle.
#[derive(Debug, Default)]
pub struct ActionDispatcher {
    suppressed: bool,
    ready: bool,
}

impl ActionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// A new snapshot arrived. Lifts the post-send suppression and adopts
    /// the server's view of our ready flag when it has one.
    pub fn on_snapshot(&mut self, snapshot: &Snapshot, me: Option<&PlayerId>) {
        self.lift_suppression();
        self.adopt_ready(snapshot, me);
    }

    /// Take the ready flag the server holds for `me`, if any.
    pub fn adopt_ready(&mut self, snapshot: &Snapshot, me: Option<&PlayerId>) {
        if let Some(ready) = me.and_then(|me| snapshot.player_ready.get(me)) {
            self.ready = *ready;
        }
    }

    pub fn lift_suppression(&mut self) {
        self.suppressed = false;
    }

    /// Action bar contents, or `None` while it should be hidden.
    pub fn action_bar(&self, snapshot: &Snapshot, me: &PlayerId) -> Option<ActionBarProps> {
        if self.suppressed || !is_my_turn(snapshot, me) {
            return None;
        }
        Some(ActionBarProps {
            call: call_option(snapshot, me)?,
            raise: raise_bounds(snapshot, me)?,
        })
    }

    /// Ready button contents. Hidden once the game is running.
    pub fn ready_button(&self, snapshot: Option<&Snapshot>) -> Option<ReadyButtonProps> {
        if snapshot.is_some_and(|s| s.game_started) {
            return None;
        }
        Some(ReadyButtonProps { ready: self.ready })
    }

    /// Build the join frame for a (trimmed) player name.
    pub fn join(&self, name: &str) -> Result<ClientFrame> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ActionError::EmptyName);
        }
        Ok(ClientFrame::PlayerJoin {
            name: name.to_string(),
        })
    }

    pub fn chat(&self, text: &str) -> Result<ClientFrame> {
        let message = text.trim();
        if message.is_empty() {
            return Err(ActionError::EmptyMessage);
        }
        Ok(ClientFrame::ChatMessage {
            message: message.to_string(),
        })
    }

    /// Flip the ready flag and tell the server. Requires a name.
    pub fn toggle_ready(
        &mut self,
        snapshot: Option<&Snapshot>,
        has_name: bool,
        outbound: &mut impl Outbound,
    ) -> Result<bool> {
        if !has_name {
            return Err(ActionError::NameRequired);
        }
        if snapshot.is_some_and(|s| s.game_started) {
            return Err(ActionError::GameInProgress);
        }
        self.ready = !self.ready;
        outbound.send(&ClientFrame::PlayerReady {
            is_ready: self.ready,
        });
        Ok(self.ready)
    }

    /// Validate `action` against the turn state and, if allowed, send it
    /// and hide the action bar until the next snapshot.
    pub fn dispatch(
        &mut self,
        snapshot: &Snapshot,
        me: &PlayerId,
        action: PlayerAction,
        outbound: &mut impl Outbound,
    ) -> Result<ClientFrame> {
        let Some(bar) = self.action_bar(snapshot, me) else {
            return Err(ActionError::NotYourTurn);
        };
        if action.action == ActionKind::Raise {
            let amount = action.amount.unwrap_or_default();
            if !bar.raise.contains(amount) {
                return Err(ActionError::InvalidRaise {
                    amount,
                    bounds: bar.raise,
                });
            }
        }

        let frame = ClientFrame::PlayerAction(action);
        if !outbound.send(&frame) {
            debug!("action dropped while disconnected: {frame}");
        }
        self.suppressed = true;
        Ok(frame)
    }

    /// Check or call, whichever the current bet calls for.
    pub fn check_or_call(
        &mut self,
        snapshot: &Snapshot,
        me: &PlayerId,
        outbound: &mut impl Outbound,
    ) -> Result<ClientFrame> {
        let action = call_option(snapshot, me)
            .map(|option| option.action)
            .unwrap_or(ActionKind::Check);
        self.dispatch(snapshot, me, PlayerAction::new(action), outbound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::PlayerView;

    #[derive(Default)]
    struct Sent(Vec<ClientFrame>);

    impl Outbound for Sent {
        fn send(&mut self, frame: &ClientFrame) -> bool {
            self.0.push(frame.clone());
            true
        }
    }

    fn player(id: &str, chips: Chips, bet: Chips) -> PlayerView {
        PlayerView {
            id: PlayerId::new(id),
            name: id.to_string(),
            chips,
            bet,
            is_connected: true,
            is_in_hand: true,
            ..Default::default()
        }
    }

    /// A to act facing a 20 bet from B.
    fn facing_bet() -> Snapshot {
        let mut snapshot = Snapshot {
            game_started: true,
            last_bet: 20,
            current_turn_index: Some(0),
            ..Default::default()
        };
        for p in [player("a", 100, 0), player("b", 80, 20)] {
            snapshot.player_order.push(p.id.clone());
            snapshot.players.insert(p.id.clone(), p);
        }
        snapshot
    }

    fn a() -> PlayerId {
        PlayerId::new("a")
    }

    #[test]
    fn test_call_label_and_bounds() {
        let snapshot = facing_bet();
        let option = call_option(&snapshot, &a()).unwrap();
        assert_eq!(option.action, ActionKind::Call);
        assert_eq!(option.label(), "Call 20");
        assert_eq!(
            raise_bounds(&snapshot, &a()),
            Some(RaiseBounds { min: 40, max: 100 })
        );
    }

    #[test]
    fn test_check_when_bet_matched() {
        let snapshot = facing_bet();
        let option = call_option(&snapshot, &PlayerId::new("b")).unwrap();
        assert_eq!(option.action, ActionKind::Check);
        assert_eq!(option.label(), "Check");
    }

    #[test]
    fn test_min_raise_from_snapshot() {
        let mut snapshot = facing_bet();
        snapshot.min_raise = Some(50);
        assert_eq!(raise_bounds(&snapshot, &a()).unwrap().min, 70);
    }

    #[test]
    fn test_turn_gating() {
        let mut snapshot = facing_bet();
        assert!(is_my_turn(&snapshot, &a()));
        assert!(!is_my_turn(&snapshot, &PlayerId::new("b")));

        snapshot.game_started = false;
        assert!(!is_my_turn(&snapshot, &a()));
        assert!(ActionDispatcher::new().action_bar(&snapshot, &a()).is_none());
    }

    #[test]
    fn test_raise_outside_bounds_not_sent() {
        let snapshot = facing_bet();
        let mut dispatcher = ActionDispatcher::new();
        let mut sent = Sent::default();

        let err = dispatcher
            .dispatch(&snapshot, &a(), PlayerAction::raise(30), &mut sent)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid raise amount!");
        assert!(err.is_input_error());
        assert!(sent.0.is_empty());
        assert!(!dispatcher.is_suppressed());

        let err = dispatcher
            .dispatch(&snapshot, &a(), PlayerAction::raise(101), &mut sent)
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidRaise { amount: 101, .. }));
        assert!(sent.0.is_empty());
    }

    #[test]
    fn test_dispatch_suppresses_until_next_snapshot() {
        let snapshot = facing_bet();
        let mut dispatcher = ActionDispatcher::new();
        let mut sent = Sent::default();

        let frame = dispatcher
            .dispatch(&snapshot, &a(), PlayerAction::raise(40), &mut sent)
            .unwrap();
        assert_eq!(frame, ClientFrame::PlayerAction(PlayerAction::raise(40)));
        assert!(dispatcher.action_bar(&snapshot, &a()).is_none());

        let err = dispatcher
            .dispatch(&snapshot, &a(), PlayerAction::new(ActionKind::Fold), &mut sent)
            .unwrap_err();
        assert_eq!(err, ActionError::NotYourTurn);
        assert_eq!(sent.0.len(), 1);

        dispatcher.on_snapshot(&snapshot, Some(&a()));
        assert!(dispatcher.action_bar(&snapshot, &a()).is_some());
    }

    #[test]
    fn test_check_or_call_picks_call() {
        let snapshot = facing_bet();
        let mut dispatcher = ActionDispatcher::new();
        let mut sent = Sent::default();
        dispatcher.check_or_call(&snapshot, &a(), &mut sent).unwrap();
        assert_eq!(
            sent.0,
            vec![ClientFrame::PlayerAction(PlayerAction::new(ActionKind::Call))]
        );
    }

    #[test]
    fn test_toggle_ready_requires_name() {
        let mut dispatcher = ActionDispatcher::new();
        let mut sent = Sent::default();
        assert_eq!(
            dispatcher.toggle_ready(None, false, &mut sent),
            Err(ActionError::NameRequired)
        );
        assert!(sent.0.is_empty());

        assert_eq!(dispatcher.toggle_ready(None, true, &mut sent), Ok(true));
        assert_eq!(dispatcher.toggle_ready(None, true, &mut sent), Ok(false));
        assert_eq!(
            sent.0,
            vec![
                ClientFrame::PlayerReady { is_ready: true },
                ClientFrame::PlayerReady { is_ready: false },
            ]
        );
    }

    #[test]
    fn test_ready_button_hidden_in_game() {
        let dispatcher = ActionDispatcher::new();
        assert!(dispatcher.ready_button(None).is_some());
        assert!(dispatcher.ready_button(Some(&facing_bet())).is_none());
    }

    #[test]
    fn test_join_and_chat_validation() {
        let dispatcher = ActionDispatcher::new();
        assert_eq!(dispatcher.join("   "), Err(ActionError::EmptyName));
        assert_eq!(
            dispatcher.join(" Alice "),
            Ok(ClientFrame::PlayerJoin {
                name: "Alice".to_string()
            })
        );
        assert_eq!(dispatcher.chat(""), Err(ActionError::EmptyMessage));
    }

    #[test]
    fn test_server_ready_flag_wins() {
        let mut snapshot = facing_bet();
        snapshot.player_ready.insert(a(), true);
        let mut dispatcher = ActionDispatcher::new();
        dispatcher.on_snapshot(&snapshot, Some(&a()));
        assert!(dispatcher.is_ready());
    }

    #[test]
    fn test_adopt_ready_keeps_suppression() {
        let mut snapshot = facing_bet();
        snapshot.player_ready.insert(a(), true);
        let mut dispatcher = ActionDispatcher::new();
        let mut sent = Sent::default();
        dispatcher
            .dispatch(&snapshot, &a(), PlayerAction::new(ActionKind::Fold), &mut sent)
            .unwrap();

        dispatcher.adopt_ready(&snapshot, Some(&a()));
        assert!(dispatcher.is_ready());
        assert!(dispatcher.is_suppressed());
        assert!(dispatcher.action_bar(&snapshot, &a()).is_none());

        dispatcher.lift_suppression();
        assert!(dispatcher.action_bar(&snapshot, &a()).is_some());
    }
}
