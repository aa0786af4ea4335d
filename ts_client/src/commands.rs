use std::fmt;
use table_sync::{Chips, Intent};

/// Help text shared by both frontends.
pub const COMMANDS_HELP: &str = "\
name NAME     join the table as NAME
ready         toggle ready (before the game starts)
fold          fold your hand
check | call  check or call the current bet
raise AMOUNT  raise the bet to AMOUNT
say TEXT      send a chat message
help          show this help
quit          leave the table";

/// A line typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    Help,
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing was typed.
    Empty,
    /// Raise without an amount.
    MissingRaiseAmount,
    /// Invalid raise amount (not a valid number).
    InvalidRaiseAmount(String),
    /// A command that needs text got none.
    MissingArgument(&'static str),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Type a command, or 'help' to see available commands"),
            Self::MissingRaiseAmount => {
                write!(f, "Raise requires an amount (e.g., 'raise 100')")
            }
            Self::InvalidRaiseAmount(value) => write!(
                f,
                "Invalid raise amount '{value}'. Must be a positive number (e.g., 'raise 100')"
            ),
            Self::MissingArgument(cmd) => write!(f, "'{cmd}' needs an argument"),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{cmd}'. Type 'help' to see available commands"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse one line of user input.
///
/// # Examples
///
/// ```
/// use table_sync::Intent;
/// use ts_client::commands::{Command, parse_command};
///
/// assert_eq!(parse_command("fold"), Ok(Command::Intent(Intent::Fold)));
/// assert_eq!(parse_command("raise 60"), Ok(Command::Intent(Intent::Raise(60))));
/// assert_eq!(
///     parse_command("say good luck"),
///     Ok(Command::Intent(Intent::Chat("good luck".to_string())))
/// );
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();
    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (trimmed, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "" => Err(ParseError::Empty),
        "fold" => Ok(Command::Intent(Intent::Fold)),
        "check" | "call" => Ok(Command::Intent(Intent::CheckOrCall)),
        "ready" => Ok(Command::Intent(Intent::ToggleReady)),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "raise" => parse_raise(rest),
        "name" => require(rest, "name").map(|name| Command::Intent(Intent::SetName(name))),
        "say" => require(rest, "say").map(|text| Command::Intent(Intent::Chat(text))),
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

/// Parse a raise command: "raise AMOUNT"
fn parse_raise(rest: &str) -> Result<Command, ParseError> {
    if rest.is_empty() {
        return Err(ParseError::MissingRaiseAmount);
    }
    let amount = rest
        .parse::<Chips>()
        .map_err(|_| ParseError::InvalidRaiseAmount(rest.to_string()))?;
    Ok(Command::Intent(Intent::Raise(amount)))
}

fn require(rest: &str, cmd: &'static str) -> Result<String, ParseError> {
    if rest.is_empty() {
        Err(ParseError::MissingArgument(cmd))
    } else {
        Ok(rest.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Single-word command tests ===

    #[test]
    fn test_parse_fold() {
        assert_eq!(parse_command("fold"), Ok(Command::Intent(Intent::Fold)));
    }

    #[test]
    fn test_parse_check_and_call_are_the_same_button() {
        assert_eq!(parse_command("check"), Ok(Command::Intent(Intent::CheckOrCall)));
        assert_eq!(parse_command("call"), Ok(Command::Intent(Intent::CheckOrCall)));
    }

    #[test]
    fn test_parse_ready() {
        assert_eq!(parse_command("ready"), Ok(Command::Intent(Intent::ToggleReady)));
    }

    #[test]
    fn test_parse_help_and_quit() {
        assert_eq!(parse_command("help"), Ok(Command::Help));
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_is_case_insensitive_and_trims() {
        assert_eq!(parse_command("  FOLD \n"), Ok(Command::Intent(Intent::Fold)));
    }

    // === Multi-word command tests ===

    #[test]
    fn test_parse_raise() {
        assert_eq!(
            parse_command("raise 100"),
            Ok(Command::Intent(Intent::Raise(100)))
        );
    }

    #[test]
    fn test_parse_raise_missing_amount() {
        assert_eq!(parse_command("raise"), Err(ParseError::MissingRaiseAmount));
    }

    #[test]
    fn test_parse_raise_invalid_amount() {
        assert_eq!(
            parse_command("raise -5"),
            Err(ParseError::InvalidRaiseAmount("-5".to_string()))
        );
        assert!(matches!(
            parse_command("raise lots"),
            Err(ParseError::InvalidRaiseAmount(_))
        ));
    }

    #[test]
    fn test_parse_name_keeps_spaces() {
        assert_eq!(
            parse_command("name Mary Ann"),
            Ok(Command::Intent(Intent::SetName("Mary Ann".to_string())))
        );
    }

    #[test]
    fn test_parse_say() {
        assert_eq!(
            parse_command("say nice hand!"),
            Ok(Command::Intent(Intent::Chat("nice hand!".to_string())))
        );
        assert_eq!(parse_command("say"), Err(ParseError::MissingArgument("say")));
    }

    // === Error tests ===

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_command("   "), Err(ParseError::Empty));
    }

    #[test]
    fn test_parse_unrecognized() {
        let err = parse_command("allin now").unwrap_err();
        assert_eq!(err, ParseError::UnrecognizedCommand("allin now".to_string()));
        assert!(err.to_string().contains("help"));
    }
}
