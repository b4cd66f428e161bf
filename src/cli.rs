//! Interactive terminal front-end
//!
//! Translates typed lines into intents on a [`CoachHandle`] and prints the
//! render events it broadcasts. Holds no session state of its own beyond the
//! context draft, the pomodoro timer and the theme.

mod editor;
mod input;
mod pomodoro;
mod render;

use crate::preferences::{system_prefers_dark, Preferences};
use crate::runtime::{CoachHandle, IntentError, RenderEvent};
use crate::state_machine::{ModeKind, Render, TransitionError};
use crate::timer::TickOutcome;
use editor::{InputEvent, LineReader};
use input::{Command, TimerCommand};
use pomodoro::Pomodoro;
use render::{Palette, TerminalView};
use rustyline::error::ReadlineError;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line editor failed: {0}")]
    Editor(#[from] ReadlineError),
}

struct Frontend<'a, W: Write> {
    handle: CoachHandle,
    renders: broadcast::Receiver<RenderEvent>,
    view: TerminalView<W>,
    preferences: Preferences,
    preferences_path: &'a Path,
    pomodoro: Pomodoro,
    context_draft: String,
}

/// Run until input closes or the user quits
pub async fn run(
    handle: CoachHandle,
    preferences: Preferences,
    preferences_path: &Path,
) -> Result<(), CliError> {
    let mut session = Frontend::new(handle, std::io::stdout(), preferences, preferences_path);
    let mut reader = LineReader::spawn()?;

    session.view.banner()?;
    // Only one line is read at a time; nothing is read while a reply is pending
    let mut reading = reader.request(session.view.prompt_text());

    loop {
        tokio::select! {
            input = reader.next() => {
                reading = false;
                match input {
                    None | Some(Ok(InputEvent::Closed)) => break,
                    Some(Ok(InputEvent::Interrupted)) => {
                        session.view.notice("Type /quit to exit.")?;
                    }
                    Some(Ok(InputEvent::Line(line))) => {
                        if !session.handle_input(&line).await? || !session.catch_up()? {
                            break;
                        }
                    }
                    Some(Err(e)) => return Err(e.into()),
                }
                if session.view.input_enabled() {
                    reading = reader.request(session.view.prompt_text());
                }
            }

            event = session.renders.recv() => match event {
                Ok(event) => {
                    session.apply(&event)?;
                    let settled = matches!(
                        event,
                        RenderEvent::ModeChanged(ModeKind::Idle | ModeKind::Conversing)
                    );
                    if settled && !reading && session.view.input_enabled() {
                        reading = reader.request(session.view.prompt_text());
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Render events dropped, terminal fell behind");
                }
                Err(RecvError::Closed) => break,
            },

            outcome = session.pomodoro.tick(), if session.pomodoro.is_running() => {
                if outcome == TickOutcome::Finished {
                    session.view.notice("Pomodoro complete! Time to take a break!")?;
                }
            }
        }
    }

    Ok(())
}

impl<'a, W: Write> Frontend<'a, W> {
    fn new(
        handle: CoachHandle,
        out: W,
        preferences: Preferences,
        preferences_path: &'a Path,
    ) -> Self {
        let palette = Palette::for_theme(preferences.theme.resolve(system_prefers_dark()));
        Self {
            renders: handle.subscribe(),
            handle,
            view: TerminalView::new(out, palette),
            preferences,
            preferences_path,
            pomodoro: Pomodoro::new(),
            context_draft: String::new(),
        }
    }

    fn apply(&mut self, event: &RenderEvent) -> Result<(), CliError> {
        if matches!(event, RenderEvent::Render(Render::ClearInputs)) {
            self.context_draft.clear();
        }
        self.view.apply(event)?;
        Ok(())
    }

    /// Print everything the runtime has already broadcast. Returns `false`
    /// once the runtime is gone.
    fn catch_up(&mut self) -> Result<bool, CliError> {
        loop {
            match self.renders.try_recv() {
                Ok(event) => self.apply(&event)?,
                Err(TryRecvError::Empty) => return Ok(true),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Render events dropped, terminal fell behind");
                }
                Err(TryRecvError::Closed) => return Ok(false),
            }
        }
    }

    /// Returns `false` when the user asked to quit
    async fn handle_input(&mut self, input: &str) -> Result<bool, CliError> {
        match Command::parse(input) {
            Command::Quit => return Ok(false),
            Command::Help => self.view.help()?,
            Command::Text(text) => {
                if matches!(
                    self.handle.snapshot().mode.kind(),
                    ModeKind::Idle | ModeKind::AwaitingFirstHint
                ) {
                    let outcome = self
                        .handle
                        .submit_problem(text, self.context_draft.clone())
                        .await;
                    if outcome.is_ok() {
                        self.context_draft.clear();
                    }
                    self.report(outcome)?;
                } else {
                    let outcome = self.handle.send_message(text).await;
                    self.report(outcome)?;
                }
            }
            Command::Context(text) => {
                if self.handle.snapshot().session.is_active() {
                    self.view
                        .notice("Context applies to new problems; use /new first.")?;
                } else {
                    self.context_draft = text;
                    self.view.notice("Context saved for the next problem.")?;
                }
            }
            Command::Another => {
                let outcome = self.handle.request_another_hint().await;
                self.report(outcome)?;
            }
            Command::Quick(kind) => {
                let outcome = self.handle.invoke_quick_action(kind).await;
                self.report(outcome)?;
            }
            Command::New => {
                let outcome = self.handle.start_new_problem().await;
                self.report(outcome)?;
            }
            Command::Timer(command) => self.handle_timer(command)?,
            Command::Theme(None) => {
                let theme = self.preferences.theme;
                let background = theme.meta_color(system_prefers_dark());
                self.view.notice(&format!("Theme: {theme} ({background})"))?;
            }
            Command::Theme(Some(Ok(theme))) => {
                self.preferences.theme = theme;
                self.view
                    .set_palette(Palette::for_theme(theme.resolve(system_prefers_dark())));
                if let Err(e) = self.preferences.save(self.preferences_path) {
                    tracing::warn!(error = %e, "Failed to save preferences");
                    self.view.error(&e.to_string())?;
                } else {
                    self.view.notice(&format!("Theme set to {theme}"))?;
                }
            }
            Command::Theme(Some(Err(name))) => {
                self.view.error(&format!(
                    "Unknown theme {name:?}. Choose system, light, dark, focus or chill."
                ))?;
            }
            Command::Unknown(name) => {
                self.view
                    .error(&format!("Unknown command /{name}. Type /help for commands."))?;
            }
        }
        Ok(true)
    }

    fn handle_timer(&mut self, command: TimerCommand) -> Result<(), CliError> {
        let message = match command {
            TimerCommand::Show => {
                let countdown = self.pomodoro.countdown();
                format!(
                    "Timer {} ({})",
                    countdown.display(),
                    if countdown.is_running() { "running" } else { "paused" }
                )
            }
            TimerCommand::Start => {
                self.pomodoro.start();
                format!("Timer started at {}", self.pomodoro.countdown().display())
            }
            TimerCommand::Pause => {
                self.pomodoro.pause();
                format!("Timer paused at {}", self.pomodoro.countdown().display())
            }
            TimerCommand::Reset => {
                self.pomodoro.reset();
                format!("Timer reset to {}", self.pomodoro.countdown().display())
            }
            TimerCommand::Set(input) => {
                if !self.pomodoro.set(&input) {
                    self.view.error(
                        "Please enter a valid time (e.g. 25, 25:00, 1:30, or 2.5 minutes)",
                    )?;
                    return Ok(());
                }
                format!("Timer set to {}", self.pomodoro.countdown().display())
            }
        };
        self.view.notice(&message)?;
        Ok(())
    }

    /// Rejected intents change nothing; tell the user why where it helps
    fn report(&mut self, outcome: Result<(), IntentError>) -> Result<(), CliError> {
        match outcome {
            Ok(()) | Err(IntentError::Rejected(TransitionError::EmptyInput)) => {}
            Err(IntentError::Rejected(e @ TransitionError::NoActiveProblem)) => {
                self.view.error(&format!("Error: {e}"))?;
            }
            Err(IntentError::Rejected(TransitionError::Busy)) => {
                self.view.notice("Still waiting for the coach...")?;
            }
            Err(IntentError::Rejected(e)) => self.view.notice(&e.to_string())?,
            Err(e @ IntentError::RuntimeStopped) => {
                tracing::error!(error = %e, "Intent not delivered");
                self.view.error(&e.to_string())?;
            }
        }
        Ok(())
    }
}
