//! Glue between the connection, the reconciler and a presenter.

use log::{debug, info};
use std::fmt;

use super::{
    dispatcher::{ActionDispatcher, ActionError},
    entity::{ConnectionProps, EntityKey, EntityProps, FeedbackKind, IndicatorState, Severity},
    presenter::Presenter,
    reconciler::ReconcilerContext,
};
use crate::{
    game::entities::{Chips, PlayerId, Snapshot},
    net::{
        client::ClientEvent,
        connection::ConnectionStatus,
        messages::{ActionKind, ClientFrame, Outbound, PlayerAction, ServerFrame},
    },
};

/// Something the local user asked for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Intent {
    SetName(String),
    ToggleReady,
    Fold,
    CheckOrCall,
    Raise(Chips),
    Chat(String),
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetName(name) => write!(f, "name {name}"),
            Self::ToggleReady => write!(f, "ready"),
            Self::Fold => write!(f, "fold"),
            Self::CheckOrCall => write!(f, "check/call"),
            Self::Raise(amount) => write!(f, "raise {amount}"),
            Self::Chat(text) => write!(f, "say {text}"),
        }
    }
}

/// One player's view of the table.
///
/// Processes server frames, connection status changes and user intents
/// strictly in the order they are handed in. Owns the presenter and every
/// handle it created.
pub struct Session<P: Presenter> {
    presenter: P,
    context: ReconcilerContext<P::Handle>,
    dispatcher: ActionDispatcher,
    my_id: Option<PlayerId>,
    name: Option<String>,
}

impl<P: Presenter> Session<P> {
    pub fn new(presenter: P) -> Self {
        let mut session = Self {
            presenter,
            context: ReconcilerContext::new(),
            dispatcher: ActionDispatcher::new(),
            my_id: None,
            name: None,
        };
        session.set_indicator(&ConnectionStatus::Disconnected {
            reason: "Disconnected".to_string(),
        });
        session.refresh_controls();
        session
    }

    /// Start with a name that is sent as soon as the connection opens.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into().trim().to_string();
        self.name = (!name.is_empty()).then_some(name);
        self
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn my_id(&self) -> Option<&PlayerId> {
        self.my_id.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.context.previous()
    }

    pub fn context(&self) -> &ReconcilerContext<P::Handle> {
        &self.context
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    pub fn handle_event(&mut self, event: ClientEvent, outbound: &mut impl Outbound) {
        match event {
            ClientEvent::Status(status) => self.handle_status(&status, outbound),
            ClientEvent::Frame(frame) => self.handle_frame(frame),
        }
    }

    pub fn handle_frame(&mut self, frame: ServerFrame) {
        match frame {
            ServerFrame::PlayerId { id } => {
                info!("assigned player id {id}");
                self.my_id = Some(id);
                self.context
                    .refresh(self.my_id.as_ref(), &mut self.presenter);
                if let Some(snapshot) = self.context.previous() {
                    self.dispatcher.adopt_ready(snapshot, self.my_id.as_ref());
                }
            }
            ServerFrame::GameState(snapshot) => {
                self.dispatcher.on_snapshot(&snapshot, self.my_id.as_ref());
                self.context
                    .apply(*snapshot, self.my_id.as_ref(), &mut self.presenter);
            }
        }
        self.refresh_controls();
    }

    pub fn handle_status(&mut self, status: &ConnectionStatus, outbound: &mut impl Outbound) {
        self.set_indicator(status);
        match status {
            ConnectionStatus::Connected => {
                if let Some(name) = &self.name {
                    debug!("joining as {name}");
                    outbound.send(&ClientFrame::PlayerJoin {
                        name: name.clone(),
                    });
                }
            }
            ConnectionStatus::Failed => {
                self.presenter
                    .show_toast("Connection failed. Restart to try again.", Severity::Error);
            }
            _ => {}
        }
    }

    /// Validate and carry out `intent`. Rejections are shown as toasts and
    /// also returned.
    pub fn handle_intent(
        &mut self,
        intent: Intent,
        outbound: &mut impl Outbound,
    ) -> Result<(), ActionError> {
        debug!("intent: {intent}");
        let result = self.run_intent(intent, outbound);
        if let Err(error) = &result {
            let severity = if error.is_input_error() {
                Severity::Error
            } else {
                Severity::Warning
            };
            self.presenter.show_toast(&error.to_string(), severity);
        }
        self.refresh_controls();
        result
    }

    /// Destroy every entity this session created.
    pub fn teardown(&mut self) {
        self.context.registry_mut().clear(&mut self.presenter);
    }

    pub fn into_presenter(mut self) -> P {
        self.teardown();
        self.presenter
    }

    fn run_intent(&mut self, intent: Intent, outbound: &mut impl Outbound) -> Result<(), ActionError> {
        match intent {
            Intent::SetName(name) => {
                let frame = self.dispatcher.join(&name)?;
                if let ClientFrame::PlayerJoin { name } = &frame {
                    self.name = Some(name.clone());
                }
                outbound.send(&frame);
            }
            Intent::ToggleReady => {
                self.dispatcher
                    .toggle_ready(self.context.previous(), self.name.is_some(), outbound)?;
            }
            Intent::Chat(text) => {
                let frame = self.dispatcher.chat(&text)?;
                outbound.send(&frame);
            }
            Intent::Fold => {
                self.act(PlayerAction::new(ActionKind::Fold), outbound)?;
                self.presenter.play_feedback(FeedbackKind::Fold);
            }
            Intent::CheckOrCall => {
                let (snapshot, me) = seated(&self.context, self.my_id.as_ref())?;
                self.dispatcher.check_or_call(snapshot, me, outbound)?;
                self.presenter.play_feedback(FeedbackKind::Call);
            }
            Intent::Raise(amount) => {
                self.act(PlayerAction::raise(amount), outbound)?;
                self.presenter.play_feedback(FeedbackKind::Raise);
            }
        }
        Ok(())
    }

    fn act(&mut self, action: PlayerAction, outbound: &mut impl Outbound) -> Result<(), ActionError> {
        let (snapshot, me) = seated(&self.context, self.my_id.as_ref())?;
        self.dispatcher.dispatch(snapshot, me, action, outbound)?;
        Ok(())
    }

    /// Bring the action bar and ready button in line with the dispatcher.
    fn refresh_controls(&mut self) {
        let snapshot = self.context.previous();
        let bar = match (snapshot, self.my_id.as_ref()) {
            (Some(snapshot), Some(me)) => self.dispatcher.action_bar(snapshot, me),
            _ => None,
        };
        let ready = self.dispatcher.ready_button(snapshot);

        let registry = self.context.registry_mut();
        match bar {
            Some(props) => {
                registry.upsert(
                    &mut self.presenter,
                    EntityKey::ActionBar,
                    EntityProps::ActionBar(props),
                );
            }
            None => {
                registry.destroy(&mut self.presenter, &EntityKey::ActionBar);
            }
        }
        match ready {
            Some(props) => {
                registry.upsert(
                    &mut self.presenter,
                    EntityKey::ReadyButton,
                    EntityProps::ReadyButton(props),
                );
            }
            None => {
                registry.destroy(&mut self.presenter, &EntityKey::ReadyButton);
            }
        }
    }

    fn set_indicator(&mut self, status: &ConnectionStatus) {
        let state = match status {
            ConnectionStatus::Connected => IndicatorState::Connected,
            ConnectionStatus::Connecting | ConnectionStatus::Reconnecting { .. } => {
                IndicatorState::Connecting
            }
            ConnectionStatus::Disconnected { .. } => IndicatorState::Disconnected,
            ConnectionStatus::Failed => IndicatorState::Failed,
        };
        self.context.registry_mut().upsert(
            &mut self.presenter,
            EntityKey::ConnectionIndicator,
            EntityProps::ConnectionIndicator(ConnectionProps {
                state,
                text: status.to_string(),
            }),
        );
    }
}

/// The current snapshot and our id, or `NotYourTurn` without both.
fn seated<'a, H>(
    context: &'a ReconcilerContext<H>,
    me: Option<&'a PlayerId>,
) -> Result<(&'a Snapshot, &'a PlayerId), ActionError> {
    match (context.previous(), me) {
        (Some(snapshot), Some(me)) => Ok((snapshot, me)),
        _ => Err(ActionError::NotYourTurn),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::entities::PlayerView,
        view::presenter::{PresenterCall, RecordingPresenter},
    };

    #[derive(Default)]
    struct Wire {
        connected: bool,
        sent: Vec<ClientFrame>,
    }

    impl Outbound for Wire {
        fn send(&mut self, frame: &ClientFrame) -> bool {
            if self.connected {
                self.sent.push(frame.clone());
            }
            self.connected
        }
    }

    fn connected() -> Wire {
        Wire {
            connected: true,
            sent: Vec::new(),
        }
    }

    fn my_turn() -> Box<Snapshot> {
        let mut snapshot = Snapshot {
            game_started: true,
            last_bet: 20,
            current_turn_index: Some(0),
            ..Default::default()
        };
        for (id, chips, bet) in [("a", 100, 0), ("b", 80, 20)] {
            let player = PlayerView {
                id: PlayerId::new(id),
                name: id.to_string(),
                chips,
                bet,
                is_connected: true,
                is_in_hand: true,
                ..Default::default()
            };
            snapshot.player_order.push(player.id.clone());
            snapshot.players.insert(player.id.clone(), player);
        }
        Box::new(snapshot)
    }

    fn session() -> Session<RecordingPresenter> {
        let mut session = Session::new(RecordingPresenter::new());
        session.handle_frame(ServerFrame::PlayerId {
            id: PlayerId::new("a"),
        });
        session.handle_frame(ServerFrame::GameState(my_turn()));
        session.presenter_mut().take();
        session
    }

    fn has(session: &Session<RecordingPresenter>, key: EntityKey) -> bool {
        session.context().registry().contains(&key)
    }

    #[test]
    fn test_new_session_shows_indicator_and_ready_button() {
        let session = Session::new(RecordingPresenter::new());
        assert!(has(&session, EntityKey::ConnectionIndicator));
        assert!(has(&session, EntityKey::ReadyButton));
        assert!(!has(&session, EntityKey::ActionBar));
    }

    #[test]
    fn test_action_bar_shown_on_my_turn() {
        let session = session();
        assert!(has(&session, EntityKey::ActionBar));
        assert!(!has(&session, EntityKey::ReadyButton));
    }

    #[test]
    fn test_fold_hides_bar_and_plays_feedback() {
        let mut session = session();
        let mut wire = connected();
        session.handle_intent(Intent::Fold, &mut wire).unwrap();

        assert!(!has(&session, EntityKey::ActionBar));
        assert_eq!(
            wire.sent,
            vec![ClientFrame::PlayerAction(PlayerAction::new(ActionKind::Fold))]
        );
        assert!(
            session
                .presenter()
                .calls
                .contains(&PresenterCall::Feedback(FeedbackKind::Fold))
        );

        session.handle_frame(ServerFrame::GameState(my_turn()));
        assert!(has(&session, EntityKey::ActionBar));
    }

    #[test]
    fn test_identity_frame_keeps_bar_suppressed() {
        let mut session = session();
        let mut wire = connected();
        session.handle_intent(Intent::Fold, &mut wire).unwrap();

        session.handle_frame(ServerFrame::PlayerId {
            id: PlayerId::new("a"),
        });

        assert!(!has(&session, EntityKey::ActionBar));
        assert_eq!(
            session.handle_intent(Intent::Fold, &mut wire),
            Err(ActionError::NotYourTurn)
        );
        assert_eq!(wire.sent.len(), 1);
    }

    #[test]
    fn test_invalid_raise_shows_toast() {
        let mut session = session();
        let mut wire = connected();
        let err = session.handle_intent(Intent::Raise(30), &mut wire).unwrap_err();
        assert!(matches!(err, ActionError::InvalidRaise { .. }));
        assert!(wire.sent.is_empty());
        let toasts: Vec<_> = session.presenter().toasts().collect();
        assert_eq!(toasts, vec![("Invalid raise amount!", Severity::Error)]);
        assert!(has(&session, EntityKey::ActionBar));
    }

    #[test]
    fn test_ready_without_name_warns() {
        let mut session = Session::new(RecordingPresenter::new());
        let mut wire = connected();
        assert!(session.handle_intent(Intent::ToggleReady, &mut wire).is_err());
        let toasts: Vec<_> = session.presenter().toasts().collect();
        assert_eq!(
            toasts,
            vec![("Please enter your name first!", Severity::Warning)]
        );
        assert!(wire.sent.is_empty());
    }

    #[test]
    fn test_rejoin_on_connect() {
        let mut session = Session::new(RecordingPresenter::new()).with_name("Alice");
        let mut wire = connected();
        session.handle_status(&ConnectionStatus::Connected, &mut wire);
        assert_eq!(
            wire.sent,
            vec![ClientFrame::PlayerJoin {
                name: "Alice".to_string()
            }]
        );
        let Some(EntityProps::ConnectionIndicator(props)) = session
            .context()
            .registry()
            .props(&EntityKey::ConnectionIndicator)
        else {
            panic!("indicator missing");
        };
        assert_eq!(props.state, IndicatorState::Connected);
        assert_eq!(props.text, "Connected");
    }

    #[test]
    fn test_set_name_then_ready() {
        let mut session = Session::new(RecordingPresenter::new());
        let mut wire = connected();
        session
            .handle_intent(Intent::SetName("  Bob ".to_string()), &mut wire)
            .unwrap();
        assert_eq!(session.name(), Some("Bob"));
        session.handle_intent(Intent::ToggleReady, &mut wire).unwrap();
        assert_eq!(wire.sent.len(), 2);
        let Some(EntityProps::ReadyButton(props)) =
            session.context().registry().props(&EntityKey::ReadyButton)
        else {
            panic!("ready button missing");
        };
        assert_eq!(props.label(), "Cancel");
    }

    #[test]
    fn test_actions_before_identity_rejected() {
        let mut session = Session::new(RecordingPresenter::new());
        let mut wire = connected();
        session.handle_frame(ServerFrame::GameState(my_turn()));
        assert_eq!(
            session.handle_intent(Intent::CheckOrCall, &mut wire),
            Err(ActionError::NotYourTurn)
        );
        assert!(wire.sent.is_empty());
    }

    #[test]
    fn test_teardown_releases_all_handles() {
        let mut session = session();
        session.teardown();
        assert!(session.context().registry().is_empty());
    }
}
