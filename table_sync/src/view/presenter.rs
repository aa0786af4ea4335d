use super::entity::{EntityKind, EntityProps, FeedbackKind, Severity};

/// Render primitives supplied by a frontend.
///
/// Calls are synchronous and cannot fail. The core never inspects a handle;
/// it only hands it back to the presenter that created it.
pub trait Presenter {
    type Handle;

    fn create_entity(&mut self, kind: EntityKind, props: &EntityProps) -> Self::Handle;

    fn update_entity(&mut self, handle: &mut Self::Handle, props: &EntityProps);

    fn destroy_entity(&mut self, handle: Self::Handle);

    fn show_toast(&mut self, text: &str, severity: Severity);

    fn play_feedback(&mut self, kind: FeedbackKind);
}

/// A presenter that records every call. Handles are sequence numbers.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    next_handle: u64,
    pub calls: Vec<PresenterCall>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PresenterCall {
    Create {
        handle: u64,
        kind: EntityKind,
        props: EntityProps,
    },
    Update {
        handle: u64,
        props: EntityProps,
    },
    Destroy {
        handle: u64,
    },
    Toast {
        text: String,
        severity: Severity,
    },
    Feedback(FeedbackKind),
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything recorded so far.
    pub fn take(&mut self) -> Vec<PresenterCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn toasts(&self) -> impl Iterator<Item = (&str, Severity)> {
        self.calls.iter().filter_map(|call| match call {
            PresenterCall::Toast { text, severity } => Some((text.as_str(), *severity)),
            _ => None,
        })
    }
}

impl Presenter for RecordingPresenter {
    type Handle = u64;

    fn create_entity(&mut self, kind: EntityKind, props: &EntityProps) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.calls.push(PresenterCall::Create {
            handle,
            kind,
            props: props.clone(),
        });
        handle
    }

    fn update_entity(&mut self, handle: &mut u64, props: &EntityProps) {
        self.calls.push(PresenterCall::Update {
            handle: *handle,
            props: props.clone(),
        });
    }

    fn destroy_entity(&mut self, handle: u64) {
        self.calls.push(PresenterCall::Destroy { handle });
    }

    fn show_toast(&mut self, text: &str, severity: Severity) {
        self.calls.push(PresenterCall::Toast {
            text: text.to_string(),
            severity,
        });
    }

    fn play_feedback(&mut self, kind: FeedbackKind) {
        self.calls.push(PresenterCall::Feedback(kind));
    }
}
