//! Terminal UI frontend.
//!
//! The table is drawn from the entities a [`Scene`] retains; the session
//! decides what exists, this module only decides how it looks.

use anyhow::Result;
use chrono::{DateTime, Utc};
use ratatui::{
    DefaultTerminal, Frame,
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    layout::{Alignment, Constraint, Flex, Layout, Margin, Position, Rect},
    style::{Style, Stylize},
    symbols::scrollbar,
    text::{Line, Span, Text},
    widgets::{
        Block, Cell, Clear, List, ListDirection, ListItem, Padding, Paragraph, Row, Scrollbar,
        ScrollbarOrientation, Table,
    },
};
use std::time::{Duration, Instant};
use table_sync::{
    Card, ClientEvent, Session, TableClient,
    view::entity::{CardFace, FeedbackKind, IndicatorState, SeatProps, SeatStatus, Severity},
};

use crate::{
    commands::{COMMANDS_HELP, Command, parse_command},
    config::ClientConfig,
    describe,
};

mod scene;
mod widgets;

pub use scene::Scene;
use widgets::{ScrollableList, UserInput};

const MAX_LOG_RECORDS: usize = 1024;
const TICK: Duration = Duration::from_millis(100);

fn make_card_span(card: &Card) -> Span<'static> {
    let repr = card.to_string();
    if card.suit.is_red() {
        Span::styled(repr, Style::default().light_red())
    } else {
        Span::raw(repr)
    }
}

fn make_face_span(face: &CardFace) -> Span<'static> {
    match face {
        CardFace::Up(card) => make_card_span(card),
        CardFace::Down => "??".dark_gray(),
    }
}

fn make_board_spans(board: &[Card]) -> Vec<Span<'static>> {
    (!board.is_empty())
        .then(|| {
            std::iter::once(" board: ".into()).chain(
                board
                    .iter()
                    .flat_map(|card| vec![make_card_span(card), "  ".into()]),
            )
        })
        .into_iter()
        .flatten()
        .collect()
}

fn make_seat_row(seat: &SeatProps) -> Row<'static> {
    let move_repr = if seat.highlight { "→" } else { "" };
    let status = match seat.status {
        SeatStatus::Normal => Span::raw(""),
        SeatStatus::AllIn => "ALL-IN".light_magenta(),
        SeatStatus::Folded => "FOLDED".dark_gray(),
    };
    let name = if seat.is_self {
        format!("{} (you)", seat.name)
    } else {
        seat.name.clone()
    };

    let mut cells = vec![
        Cell::new(Text::from(move_repr).alignment(Alignment::Center)),
        Cell::new(Text::from(describe::badges(&seat.badges)).alignment(Alignment::Left)),
        Cell::new(Text::from(name).alignment(Alignment::Left)),
        Cell::new(Text::from(format!("${}", seat.chips)).alignment(Alignment::Right)),
        Cell::new(Text::from(format!("bet ${}", seat.bet)).alignment(Alignment::Right)),
        Cell::new(Text::from(status).alignment(Alignment::Center)),
    ];
    for idx in 0..2 {
        let card = seat.cards.get(idx).map_or_else(|| "".into(), make_face_span);
        cells.push(Cell::new(Text::from(card).alignment(Alignment::Right)));
    }

    let mut row = Row::new(cells);
    if seat.dimmed {
        row = row.dark_gray();
    } else if seat.is_self {
        row = row.bold().white();
    }
    row
}

#[derive(Clone, Copy)]
pub(crate) enum RecordKind {
    Ack,
    Alert,
    Chat,
    Error,
    Game,
    You,
}

/// A timestamped terminal message with an importance label to help
/// direct user attention.
#[derive(Clone)]
pub(crate) struct Record {
    datetime: DateTime<Utc>,
    kind: RecordKind,
    content: String,
}

impl Record {
    fn new(kind: RecordKind, content: String) -> Self {
        Self {
            datetime: Utc::now(),
            kind,
            content,
        }
    }
}

impl From<Record> for ListItem<'_> {
    fn from(val: Record) -> Self {
        let repr = match val.kind {
            RecordKind::Ack => "ACK".light_blue(),
            RecordKind::Alert => "ALERT".light_magenta(),
            RecordKind::Chat => "CHAT".light_cyan(),
            RecordKind::Error => "ERROR".light_red(),
            RecordKind::Game => "GAME".light_yellow(),
            RecordKind::You => "YOU".light_green(),
        };

        let msg = vec![
            format!("[{} ", val.datetime.format("%H:%M:%S")).into(),
            Span::styled(format!("{repr:5}"), repr.style),
            format!("]: {}", val.content).into(),
        ];

        ListItem::new(Line::from(msg))
    }
}

enum Wake {
    Event(Option<ClientEvent>),
    Tick,
}

#[derive(PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// TUI App state
pub struct TuiApp {
    client: TableClient,
    session: Session<Scene>,
    /// Whether to display the help menu window
    show_help_menu: bool,
    /// Helps scroll through the help menu window if the terminal is small
    help_handle: ScrollableList,
    /// History of recorded messages
    log_handle: ScrollableList,
    /// Current value of the input box
    user_input: UserInput,
}

impl TuiApp {
    pub fn new(config: &ClientConfig) -> Self {
        let mut help_handle = ScrollableList::new(MAX_LOG_RECORDS);
        help_handle.push("".into());
        for line in COMMANDS_HELP.lines() {
            help_handle.push(format!(" {line}").into());
        }
        help_handle.push("".into());
        help_handle.jump_to_first();

        let mut session = Session::new(Scene::new());
        if let Some(name) = &config.player_name {
            session = session.with_name(name.clone());
        }

        Self {
            client: TableClient::new(config.server_url.clone(), config.reconnect.policy()),
            session,
            show_help_menu: false,
            help_handle,
            log_handle: ScrollableList::new(MAX_LOG_RECORDS),
            user_input: UserInput::new(),
        }
    }

    fn add_log(&mut self, kind: RecordKind, content: String) {
        self.log_handle.push(Record::new(kind, content).into());
    }

    /// Move records the scene produced since the last frame into the log.
    fn collect_records(&mut self) {
        let records: Vec<_> = self.session.presenter_mut().drain_records().collect();
        for record in records {
            self.log_handle.push(record.into());
        }
    }

    fn handle_command(&mut self, user_input: &str) -> Flow {
        match parse_command(user_input) {
            Ok(Command::Intent(intent)) => {
                self.add_log(RecordKind::You, intent.to_string());
                if let Err(error) = self.session.handle_intent(intent, &mut self.client) {
                    log::debug!("intent rejected: {error}");
                }
            }
            Ok(Command::Help) => self.show_help_menu = true,
            Ok(Command::Quit) => return Flow::Quit,
            Err(error) => self.add_log(RecordKind::Error, error.to_string()),
        }
        Flow::Continue
    }

    fn handle_event(&mut self, event: ClientEvent) {
        let last_chat = self.session.presenter().chat().last().cloned();
        self.session.handle_event(event, &mut self.client);
        if let Some(line) = self.session.presenter().chat().last() {
            if last_chat.as_ref() != Some(line) {
                let line = line.to_string();
                self.add_log(RecordKind::Chat, line);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }
        match key.modifiers {
            KeyModifiers::CONTROL => match key.code {
                KeyCode::Char('c') => return Flow::Quit,
                KeyCode::Home => self.log_handle.jump_to_first(),
                KeyCode::End => self.log_handle.jump_to_last(),
                _ => {}
            },
            KeyModifiers::NONE | KeyModifiers::SHIFT => match key.code {
                KeyCode::Enter => {
                    let user_input = self.user_input.submit();
                    return self.handle_command(&user_input);
                }
                KeyCode::Char(to_insert) => self.user_input.input(to_insert),
                KeyCode::Backspace => self.user_input.backspace(),
                KeyCode::Delete => self.user_input.delete(),
                KeyCode::Left => self.user_input.move_left(),
                KeyCode::Right => self.user_input.move_right(),
                KeyCode::Up => {
                    if self.show_help_menu {
                        self.help_handle.move_up();
                    } else {
                        self.log_handle.move_up();
                    }
                }
                KeyCode::Down => {
                    if self.show_help_menu {
                        self.help_handle.move_down();
                    } else {
                        self.log_handle.move_down();
                    }
                }
                KeyCode::Home => self.user_input.jump_to_first(),
                KeyCode::End => self.user_input.jump_to_last(),
                KeyCode::Tab => self.show_help_menu = !self.show_help_menu,
                KeyCode::Esc => return Flow::Quit,
                _ => {}
            },
            _ => {}
        }
        Flow::Continue
    }

    /// Render the seats, board and pot
    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let scene = self.session.presenter();
        let border = match scene.flash() {
            Some(FeedbackKind::Fold) => Style::default().dark_gray(),
            Some(FeedbackKind::Call) => Style::default().light_yellow(),
            Some(FeedbackKind::Raise) => Style::default().light_magenta(),
            None => Style::default(),
        };
        let title_bottom = match scene.hud() {
            Some(hud) => {
                let mut text = format!(
                    " {}  players: {}  pot: ${}",
                    hud.phase,
                    hud.player_count,
                    scene.pot().unwrap_or_default()
                );
                if let Some(chips) = hud.my_chips {
                    text.push_str(&format!("  your chips: ${chips}"));
                }
                text.push_str("  ");
                text
            }
            None => " waiting for the table  ".to_string(),
        };

        let table = Table::new(
            scene.seats().into_iter().map(make_seat_row),
            [
                Constraint::Max(3),
                Constraint::Fill(1),
                Constraint::Fill(3),
                Constraint::Fill(2),
                Constraint::Fill(2),
                Constraint::Fill(2),
                Constraint::Fill(1),
                Constraint::Fill(1),
            ],
        )
        .block(
            Block::bordered()
                .border_style(border)
                .padding(Padding::uniform(1))
                .title_top(Line::from(make_board_spans(scene.board())))
                .title_bottom(title_bottom),
        );
        frame.render_widget(table, area);
    }

    /// Render the controls: turn actions, the ready button or the result
    fn draw_controls(&self, frame: &mut Frame, area: Rect) {
        let scene = self.session.presenter();
        let mut spans: Vec<Span> = Vec::new();
        if let Some(result) = scene.result() {
            spans.push(" ".into());
            spans.push(result.to_string().light_yellow().bold());
        } else if let Some(bar) = scene.action_bar() {
            spans.push(" ".into());
            spans.push(describe::action_bar(bar).light_green().bold());
        } else if let Some(button) = scene.ready_button() {
            spans.push(" type ".into());
            spans.push("ready".bold().white());
            spans.push(" for ".into());
            spans.push(format!("[{}]", button.label()).light_cyan());
        }
        let controls = Paragraph::new(Line::from(spans)).block(Block::bordered().title(" you  "));
        frame.render_widget(controls, area);
    }

    /// Render the last chat lines
    fn draw_chat(&self, frame: &mut Frame, area: Rect) {
        let lines = self
            .session
            .presenter()
            .chat()
            .iter()
            .map(|line| ListItem::new(line.to_string()));
        let chat = List::new(lines).block(Block::bordered().title(" chat  "));
        frame.render_widget(chat, area);
    }

    /// Render the log/history window with scrollbar
    fn draw_log(&mut self, frame: &mut Frame, area: Rect) {
        let log_records = self.log_handle.list_items.clone();
        let log_records = List::new(log_records)
            .direction(ListDirection::BottomToTop)
            .block(Block::bordered().title(" history  "));
        frame.render_stateful_widget(log_records, area, &mut self.log_handle.list_state);

        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .symbols(scrollbar::VERTICAL)
                .begin_symbol(None)
                .end_symbol(None),
            area.inner(Margin {
                vertical: 1,
                horizontal: 1,
            }),
            &mut self.log_handle.scroll_state,
        );
    }

    /// Render the user input area
    fn draw_user_input(&self, frame: &mut Frame, area: Rect) {
        let title = match self.session.name() {
            Some(name) => format!(" {name}  "),
            None => " type 'name NAME' to join  ".to_string(),
        };
        let user_input = Paragraph::new(self.user_input.value.as_str())
            .block(Block::bordered().title(title.light_green()));
        frame.render_widget(user_input, area);
        frame.set_cursor_position(Position::new(
            area.x + self.user_input.char_idx as u16 + 1,
            area.y + 1,
        ));
    }

    /// Render the help/status bar at the bottom
    fn draw_help_bar(&self, frame: &mut Frame, area: Rect) {
        let status_indicator = match self.session.presenter().connection() {
            Some(props) => {
                let text = format!("{} {}", describe::indicator(props.state), props.text);
                match props.state {
                    IndicatorState::Connected => text.green(),
                    IndicatorState::Connecting => text.yellow(),
                    IndicatorState::Disconnected | IndicatorState::Failed => text.red(),
                }
            }
            None => "○ Disconnected".red(),
        };

        let help_message = vec![
            status_indicator,
            " | press ".into(),
            "Tab".bold().white(),
            " to view help, press ".into(),
            "Enter".bold().white(),
            " to send a command, or press ".into(),
            "Esc".bold().white(),
            " to exit".into(),
        ];
        frame.render_widget(Paragraph::new(Line::from(help_message)), area);
    }

    /// Render the active toasts in the top right corner
    fn draw_toasts(&self, frame: &mut Frame) {
        let toasts = self.session.presenter().toasts();
        if toasts.is_empty() {
            return;
        }
        let lines: Vec<Line> = toasts
            .iter()
            .map(|toast| {
                let text = format!(" {} ", toast.text);
                Line::from(match toast.severity {
                    Severity::Error => text.white().on_red(),
                    Severity::Warning => text.black().on_yellow(),
                    Severity::Info => text.black().on_cyan(),
                })
            })
            .collect();
        let width = lines
            .iter()
            .map(Line::width)
            .max()
            .unwrap_or_default()
            .min(frame.area().width as usize) as u16;
        let vertical = Layout::vertical([Constraint::Length(lines.len() as u16)]).flex(Flex::Start);
        let horizontal = Layout::horizontal([Constraint::Length(width)]).flex(Flex::End);
        let [area] = vertical.areas(frame.area());
        let [area] = horizontal.areas(area);
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines), area);
    }

    /// Render the help menu overlay
    fn draw_help_menu(&mut self, frame: &mut Frame) {
        let vertical = Layout::vertical([Constraint::Max(14)]).flex(Flex::Center);
        let horizontal = Layout::horizontal([Constraint::Max(60)]).flex(Flex::Center);
        let [help_menu_area] = vertical.areas(frame.area());
        let [help_menu_area] = horizontal.areas(help_menu_area);
        frame.render_widget(Clear, help_menu_area);

        let help_items = self.help_handle.list_items.clone();
        let help_items = List::new(help_items)
            .direction(ListDirection::BottomToTop)
            .block(Block::bordered().title(" commands  "));
        frame.render_stateful_widget(
            help_items,
            help_menu_area,
            &mut self.help_handle.list_state,
        );

        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .symbols(scrollbar::VERTICAL)
                .begin_symbol(None)
                .end_symbol(None),
            help_menu_area.inner(Margin {
                vertical: 1,
                horizontal: 1,
            }),
            &mut self.help_handle.scroll_state,
        );
    }

    fn draw(&mut self, frame: &mut Frame) {
        let window = Layout::vertical([
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(1),
        ]);
        let [top_area, user_input_area, help_area] = window.areas(frame.area());

        let [table_column, side_column] =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                .areas(top_area);
        let [table_area, controls_area] =
            Layout::vertical([Constraint::Min(5), Constraint::Length(3)]).areas(table_column);
        let [chat_area, log_area] =
            Layout::vertical([Constraint::Percentage(40), Constraint::Percentage(60)])
                .areas(side_column);

        self.draw_table(frame, table_area);
        self.draw_controls(frame, controls_area);
        self.draw_chat(frame, chat_area);
        self.draw_log(frame, log_area);
        self.draw_user_input(frame, user_input_area);
        self.draw_help_bar(frame, help_area);
        self.draw_toasts(frame);

        if self.show_help_menu {
            self.draw_help_menu(frame);
        }
    }

    /// Run the TUI application until the user quits.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        self.client.connect();
        let mut tick = tokio::time::interval(TICK);

        'ui: loop {
            self.collect_records();
            terminal.draw(|frame| self.draw(frame))?;

            let wake = tokio::select! {
                event = self.client.next_event() => Wake::Event(event),
                _ = tick.tick() => Wake::Tick,
            };
            match wake {
                Wake::Event(Some(event)) => self.handle_event(event),
                Wake::Event(None) => break,
                Wake::Tick => {}
            }
            self.session.presenter_mut().expire(Instant::now());

            while event::poll(Duration::ZERO)? {
                if let Event::Key(key) = event::read()? {
                    if self.handle_key(key) == Flow::Quit {
                        break 'ui;
                    }
                }
            }
        }

        self.client.shutdown().await;
        self.session.teardown();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;
    use table_sync::entities::{Rank, Suit};

    #[test]
    fn test_red_suits_are_coloured() {
        let heart = make_card_span(&Card::new(Rank::Nine, Suit::Heart));
        let diamond = make_card_span(&Card::new(Rank::Nine, Suit::Diamond));
        let spade = make_card_span(&Card::new(Rank::Nine, Suit::Spade));
        assert_eq!(heart.style.fg, Some(Color::LightRed));
        assert_eq!(diamond.style.fg, Some(Color::LightRed));
        assert_eq!(spade.style.fg, None);
    }
}
