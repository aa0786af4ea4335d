//! Line mode: commands on stdin, entity changes printed as text.

use anyhow::Result;
use log::{info, warn};
use std::io::Write;
use table_sync::{
    ClientEvent, Presenter, Session, TableClient,
    view::entity::{EntityKind, EntityProps, FeedbackKind, Severity},
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    commands::{COMMANDS_HELP, Command, parse_command},
    config::ClientConfig,
    describe::describe,
};

/// Handle given out by [`LinePresenter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineHandle {
    pub id: u64,
    pub kind: EntityKind,
}

/// Prints every presenter call as one line of text.
pub struct LinePresenter<W> {
    out: W,
    next_id: u64,
}

impl<W: Write> LinePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out, next_id: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn print(&mut self, line: &str) {
        if let Err(error) = writeln!(self.out, "{line}") {
            warn!("failed to write output: {error}");
        }
    }
}

impl<W: Write> Presenter for LinePresenter<W> {
    type Handle = LineHandle;

    fn create_entity(&mut self, kind: EntityKind, props: &EntityProps) -> LineHandle {
        let handle = LineHandle {
            id: self.next_id,
            kind,
        };
        self.next_id += 1;
        self.print(&format!("+ {}", describe(props)));
        handle
    }

    fn update_entity(&mut self, _handle: &mut LineHandle, props: &EntityProps) {
        self.print(&format!("~ {}", describe(props)));
    }

    fn destroy_entity(&mut self, handle: LineHandle) {
        self.print(&format!("- {:?}", handle.kind).to_lowercase());
    }

    fn show_toast(&mut self, text: &str, severity: Severity) {
        let label = match severity {
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
            Severity::Error => "ERROR",
        };
        self.print(&format!("[{label}] {text}"));
    }

    fn play_feedback(&mut self, kind: FeedbackKind) {
        let text = match kind {
            FeedbackKind::Fold => "*fold*",
            FeedbackKind::Call => "*chips*",
            FeedbackKind::Raise => "*chips!*",
        };
        self.print(text);
    }
}

enum Input {
    Event(Option<ClientEvent>),
    Line(Option<String>),
    Interrupted,
}

/// Run the line mode client until `quit`, end of input or ctrl-c.
pub async fn run(config: ClientConfig) -> Result<()> {
    let mut client = TableClient::new(config.server_url.clone(), config.reconnect.policy());
    let mut session = Session::new(LinePresenter::new(std::io::stdout()));
    if let Some(name) = &config.player_name {
        session = session.with_name(name.clone());
    }

    println!("Connecting to {}...", config.server_url);
    println!("Type 'help' for commands.");
    client.connect();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let input = tokio::select! {
            event = client.next_event() => Input::Event(event),
            line = lines.next_line() => Input::Line(line?),
            _ = tokio::signal::ctrl_c() => Input::Interrupted,
        };

        match input {
            Input::Event(Some(event)) => session.handle_event(event, &mut client),
            Input::Event(None) => break,
            Input::Line(Some(line)) => match parse_command(&line) {
                Ok(Command::Intent(intent)) => {
                    let _ = session.handle_intent(intent, &mut client);
                }
                Ok(Command::Help) => session.presenter_mut().print(COMMANDS_HELP),
                Ok(Command::Quit) => break,
                Err(error) => session.presenter_mut().print(&error.to_string()),
            },
            Input::Line(None) => {
                info!("end of input");
                break;
            }
            Input::Interrupted => {
                info!("interrupted");
                break;
            }
        }
    }

    println!("Disconnecting...");
    client.shutdown().await;
    session.teardown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use table_sync::{Intent, Outbound, ServerFrame, messages::ClientFrame};

    struct Offline;

    impl Outbound for Offline {
        fn send(&mut self, _frame: &ClientFrame) -> bool {
            false
        }
    }

    fn output(presenter: LinePresenter<Vec<u8>>) -> String {
        String::from_utf8(presenter.into_inner()).unwrap()
    }

    #[test]
    fn test_prints_entity_lifecycle() {
        let mut session = Session::new(LinePresenter::new(Vec::new()));
        session.handle_frame(
            ServerFrame::decode(r#"{"type":"game_state","payload":{"pot":15}}"#).unwrap(),
        );
        let out = output(session.into_presenter());
        assert!(out.contains("+ ○ Disconnected"));
        assert!(out.contains("+ pot: $15"));
        assert!(out.contains("+ ready button: [Ready to Play]"));
        assert!(out.contains("- pot"));
    }

    #[test]
    fn test_prints_validation_toast() {
        let mut session = Session::new(LinePresenter::new(Vec::new()));
        assert!(
            session
                .handle_intent(Intent::ToggleReady, &mut Offline)
                .is_err()
        );
        let out = output(session.into_presenter());
        assert!(out.contains("[WARN] Please enter your name first!"));
    }
}
