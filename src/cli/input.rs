//! Command parsing for the terminal front-end

use crate::preferences::Theme;
use crate::state_machine::MessageType;

/// Slash commands offered for completion
pub const COMMAND_NAMES: [&str; 13] = [
    "/another",
    "/analyze",
    "/context",
    "/exit",
    "/explain",
    "/help",
    "/hint",
    "/new",
    "/optimize",
    "/quit",
    "/suggest",
    "/theme",
    "/timer",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerCommand {
    Show,
    Start,
    Pause,
    Reset,
    Set(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Free text: a problem name when idle, otherwise a chat message
    Text(String),
    Context(String),
    Another,
    Quick(MessageType),
    New,
    Timer(TimerCommand),
    Theme(Option<Result<Theme, String>>),
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let Some(rest) = input.trim_start().strip_prefix('/') else {
            return Command::Text(input.to_string());
        };
        let (name, argument) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(name, argument)| (name, argument.trim()));

        match name.to_ascii_lowercase().as_str() {
            "context" => Command::Context(argument.to_string()),
            "another" => Command::Another,
            "new" => Command::New,
            "timer" => Command::Timer(match argument.to_ascii_lowercase().as_str() {
                "" => TimerCommand::Show,
                "start" => TimerCommand::Start,
                "pause" => TimerCommand::Pause,
                "reset" => TimerCommand::Reset,
                _ => TimerCommand::Set(argument.to_string()),
            }),
            "theme" if argument.is_empty() => Command::Theme(None),
            "theme" => Command::Theme(Some(
                argument.parse().map_err(|_| argument.to_string()),
            )),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => match other.parse::<MessageType>() {
                Ok(kind) if MessageType::QUICK_ACTIONS.contains(&kind) => Command::Quick(kind),
                _ => Command::Unknown(name.to_string()),
            },
        }
    }
}
