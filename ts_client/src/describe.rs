//! Plain text renderings of entity descriptors.

use table_sync::view::entity::{
    ActionBarProps, Badge, CardFace, EntityProps, IndicatorState, SeatProps, SeatStatus,
};

pub fn cards(faces: &[CardFace]) -> String {
    faces
        .iter()
        .map(CardFace::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn badges(badges: &[Badge]) -> String {
    badges
        .iter()
        .map(|badge| format!("[{badge}]"))
        .collect::<Vec<_>>()
        .join("")
}

pub fn seat(seat: &SeatProps) -> String {
    let mut line = format!(
        "{}{} {}{} ${} bet ${}",
        if seat.highlight { "→ " } else { "" },
        seat.seat,
        seat.name,
        if seat.is_self { " (you)" } else { "" },
        seat.chips,
        seat.bet,
    );
    if !seat.badges.is_empty() {
        line.push(' ');
        line.push_str(&badges(&seat.badges));
    }
    if seat.status != SeatStatus::Normal {
        line.push_str(&format!(" {}", seat.status));
    }
    if !seat.cards.is_empty() {
        line.push_str(&format!(" | {}", cards(&seat.cards)));
    }
    line
}

pub fn action_bar(bar: &ActionBarProps) -> String {
    format!(
        "your turn: fold | {} | raise {}",
        bar.call.label(),
        bar.raise
    )
}

pub fn indicator(state: IndicatorState) -> &'static str {
    match state {
        IndicatorState::Connected => "●",
        IndicatorState::Connecting => "◌",
        IndicatorState::Disconnected | IndicatorState::Failed => "○",
    }
}

/// One line summary of an entity.
pub fn describe(props: &EntityProps) -> String {
    match props {
        EntityProps::Seat(props) => format!("seat {}", seat(props)),
        EntityProps::Board { cards } => format!(
            "board: {}",
            cards
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        ),
        EntityProps::Pot { amount } => format!("pot: ${amount}"),
        EntityProps::Hud(hud) => match hud.my_chips {
            Some(chips) => format!(
                "{} | {} player(s) | your chips: ${chips}",
                hud.phase, hud.player_count
            ),
            None => format!("{} | {} player(s)", hud.phase, hud.player_count),
        },
        EntityProps::ChatLog { lines } => match lines.last() {
            Some(line) => format!("chat: {line}"),
            None => "chat: (empty)".to_string(),
        },
        EntityProps::Result { description } => format!("result: {description}"),
        EntityProps::ActionBar(bar) => action_bar(bar),
        EntityProps::ReadyButton(button) => format!("ready button: [{}]", button.label()),
        EntityProps::ConnectionIndicator(props) => {
            format!("{} {}", indicator(props.state), props.text)
        }
    }
}
