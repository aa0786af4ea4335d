use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};
use table_sync::{
    Presenter,
    view::entity::{
        ActionBarProps, ChatLine, ConnectionProps, EntityKind, EntityProps, FeedbackKind,
        HudProps, ReadyButtonProps, SeatProps, Severity,
    },
};

use super::{Record, RecordKind};

pub const TOAST_TTL: Duration = Duration::from_secs(3);
const FLASH_TTL: Duration = Duration::from_millis(300);

pub struct Toast {
    pub text: String,
    pub severity: Severity,
    expires: Instant,
}

/// Retained entity store drawn by the TUI each frame.
#[derive(Default)]
pub struct Scene {
    next_handle: u64,
    entities: BTreeMap<u64, EntityProps>,
    toasts: Vec<Toast>,
    flash: Option<(FeedbackKind, Instant)>,
    /// History lines not yet moved into the log window
    records: Vec<Record>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    fn find<T>(&self, f: impl Fn(&EntityProps) -> Option<&T>) -> Option<&T> {
        self.entities.values().find_map(f)
    }

    /// Seats ordered by layout slot.
    pub fn seats(&self) -> Vec<&SeatProps> {
        let mut seats: Vec<_> = self
            .entities
            .values()
            .filter_map(|props| match props {
                EntityProps::Seat(seat) => Some(seat),
                _ => None,
            })
            .collect();
        seats.sort_by_key(|seat| seat.seat);
        seats
    }

    pub fn board(&self) -> &[table_sync::Card] {
        self.find(|props| match props {
            EntityProps::Board { cards } => Some(cards),
            _ => None,
        })
        .map(Vec::as_slice)
        .unwrap_or_default()
    }

    pub fn pot(&self) -> Option<table_sync::Chips> {
        self.find(|props| match props {
            EntityProps::Pot { amount } => Some(amount),
            _ => None,
        })
        .copied()
    }

    pub fn hud(&self) -> Option<&HudProps> {
        self.find(|props| match props {
            EntityProps::Hud(hud) => Some(hud),
            _ => None,
        })
    }

    pub fn chat(&self) -> &[ChatLine] {
        self.find(|props| match props {
            EntityProps::ChatLog { lines } => Some(lines),
            _ => None,
        })
        .map(Vec::as_slice)
        .unwrap_or_default()
    }

    pub fn result(&self) -> Option<&str> {
        self.find(|props| match props {
            EntityProps::Result { description } => Some(description),
            _ => None,
        })
        .map(String::as_str)
    }

    pub fn action_bar(&self) -> Option<&ActionBarProps> {
        self.find(|props| match props {
            EntityProps::ActionBar(bar) => Some(bar),
            _ => None,
        })
    }

    pub fn ready_button(&self) -> Option<&ReadyButtonProps> {
        self.find(|props| match props {
            EntityProps::ReadyButton(button) => Some(button),
            _ => None,
        })
    }

    pub fn connection(&self) -> Option<&ConnectionProps> {
        self.find(|props| match props {
            EntityProps::ConnectionIndicator(props) => Some(props),
            _ => None,
        })
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn flash(&self) -> Option<FeedbackKind> {
        self.flash.map(|(kind, _)| kind)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Drop toasts and feedback whose time is up.
    pub fn expire(&mut self, now: Instant) {
        self.toasts.retain(|toast| toast.expires > now);
        if let Some((_, until)) = self.flash {
            if until <= now {
                self.flash = None;
            }
        }
    }

    pub(crate) fn drain_records(&mut self) -> std::vec::Drain<'_, Record> {
        self.records.drain(..)
    }

    fn note(&mut self, props: &EntityProps) {
        match props {
            EntityProps::Result { description } => self
                .records
                .push(Record::new(RecordKind::Game, description.clone())),
            EntityProps::ActionBar(_) => self
                .records
                .push(Record::new(RecordKind::Alert, "It's your turn!".to_string())),
            EntityProps::ConnectionIndicator(props) => self
                .records
                .push(Record::new(RecordKind::Ack, props.text.clone())),
            _ => {}
        }
    }
}

impl Presenter for Scene {
    type Handle = u64;

    fn create_entity(&mut self, _kind: EntityKind, props: &EntityProps) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.note(props);
        self.entities.insert(handle, props.clone());
        handle
    }

    fn update_entity(&mut self, handle: &mut u64, props: &EntityProps) {
        if let EntityProps::ConnectionIndicator(_) = props {
            self.note(props);
        }
        self.entities.insert(*handle, props.clone());
    }

    fn destroy_entity(&mut self, handle: u64) {
        self.entities.remove(&handle);
    }

    fn show_toast(&mut self, text: &str, severity: Severity) {
        let kind = match severity {
            Severity::Error => RecordKind::Error,
            Severity::Warning | Severity::Info => RecordKind::Alert,
        };
        self.records.push(Record::new(kind, text.to_string()));
        self.toasts.push(Toast {
            text: text.to_string(),
            severity,
            expires: Instant::now() + TOAST_TTL,
        });
    }

    fn play_feedback(&mut self, kind: FeedbackKind) {
        self.flash = Some((kind, Instant::now() + FLASH_TTL));
    }
}
