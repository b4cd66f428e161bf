//! Line editing for the terminal front-end
//!
//! rustyline blocks, so the editor lives on its own thread. The front-end
//! asks for a line by sending the prompt to show and receives the result on
//! a channel it can `select!` on.

use super::input::COMMAND_NAMES;
use crossterm::style::{Color, Stylize};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Editor, Helper};
use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::mpsc as std_mpsc;
use tokio::sync::mpsc;

/// Completion, hints and multi-line input for slash commands
#[derive(Debug, Default, Clone)]
pub struct CoachHelper;

impl Helper for CoachHelper {}

impl Completer for CoachHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let candidates = matching_commands(line.get(..pos).unwrap_or(line))
            .map(|name| Pair {
                display: name.to_string(),
                replacement: name.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Hinter for CoachHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        command_hint(line).map(str::to_string)
    }
}

impl Highlighter for CoachHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.with(Color::Cyan).to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.with(Color::DarkGrey).to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Validator for CoachHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        if is_continued(ctx.input()) {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

/// Commands starting with `prefix`; nothing once an argument is being typed
fn matching_commands(prefix: &str) -> impl Iterator<Item = &'static str> + '_ {
    let typing_command = prefix.starts_with('/') && !prefix.contains(char::is_whitespace);
    COMMAND_NAMES
        .into_iter()
        .filter(move |name| typing_command && name.starts_with(prefix))
}

/// Rest of the first command that completes `line`
fn command_hint(line: &str) -> Option<&'static str> {
    matching_commands(line)
        .find(|name| name.len() > line.len())
        .and_then(|name| name.get(line.len()..))
}

/// A trailing backslash keeps the input open for another line
fn is_continued(input: &str) -> bool {
    input.ends_with('\\')
}

/// Drop the backslash before each line break of a multi-line input
pub fn join_continuations(buffer: &str) -> String {
    buffer.replace("\\\n", "\n")
}

#[derive(Debug)]
pub enum InputEvent {
    Line(String),
    /// Ctrl-C at the prompt
    Interrupted,
    /// Ctrl-D or end of input
    Closed,
}

/// Handle to the editor thread
pub struct LineReader {
    prompts: std_mpsc::Sender<String>,
    events: mpsc::UnboundedReceiver<Result<InputEvent, ReadlineError>>,
}

impl LineReader {
    pub fn spawn() -> std::io::Result<Self> {
        let (prompts, requests) = std_mpsc::channel::<String>();
        let (events_tx, events) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("line-editor".to_string())
            .spawn(move || {
                let mut editor: Editor<CoachHelper, DefaultHistory> = match Editor::new() {
                    Ok(editor) => editor,
                    Err(e) => {
                        let _ = events_tx.send(Err(e));
                        return;
                    }
                };
                editor.set_helper(Some(CoachHelper));

                while let Ok(prompt) = requests.recv() {
                    let event = match editor.readline(&prompt) {
                        Ok(buffer) => {
                            if !buffer.trim().is_empty() {
                                let _ = editor.add_history_entry(buffer.as_str());
                            }
                            Ok(InputEvent::Line(join_continuations(&buffer)))
                        }
                        Err(ReadlineError::Interrupted) => Ok(InputEvent::Interrupted),
                        Err(ReadlineError::Eof) => Ok(InputEvent::Closed),
                        Err(e) => Err(e),
                    };
                    if events_tx.send(event).is_err() {
                        break;
                    }
                }
                tracing::debug!("Line editor thread exiting");
            })?;

        Ok(Self { prompts, events })
    }

    /// Ask the editor to read one line behind `prompt`
    pub fn request(&self, prompt: &str) -> bool {
        self.prompts.send(prompt.to_string()).is_ok()
    }

    /// Next result from the editor; `None` once its thread is gone
    pub async fn next(&mut self) -> Option<Result<InputEvent, ReadlineError>> {
        self.events.recv().await
    }
}
