//! Pomodoro countdown
//!
//! Independent of the coaching session: nothing here touches the state machine.

use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_DURATION_SECS: u32 = 25 * 60;

const MAX_MINUTES: u32 = 999;
const MAX_SECONDS: u32 = 3600;

static MINUTES_SECONDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("mm:ss regex must compile"));
static WHOLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("whole number regex must compile"));
static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+$").expect("decimal regex must compile"));
static RAW_SECONDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3,4}$").expect("seconds regex must compile"));

/// Parse a duration typed by the user into seconds.
///
/// Accepted forms, tried in order:
/// - `MM:SS` with seconds below 60
/// - whole minutes, 1 to 999
/// - decimal minutes, 1 to 999, rounded to the nearest second
/// - three or four digits read as seconds, 1 to 3600
pub fn parse_time_input(input: &str) -> Option<u32> {
    let input = input.trim();

    if let Some(caps) = MINUTES_SECONDS.captures(input) {
        let minutes: u32 = caps.get(1)?.as_str().parse().ok()?;
        let seconds: u32 = caps.get(2)?.as_str().parse().ok()?;
        if seconds < 60 {
            return Some(minutes * 60 + seconds);
        }
    }

    if WHOLE.is_match(input) {
        if let Ok(minutes) = input.parse::<u32>() {
            if (1..=MAX_MINUTES).contains(&minutes) {
                return Some(minutes * 60);
            }
        }
    }

    if DECIMAL.is_match(input) {
        if let Ok(minutes) = input.parse::<f64>() {
            if minutes > 0.0 && minutes <= f64::from(MAX_MINUTES) {
                return Some(round_seconds(minutes * 60.0));
            }
        }
    }

    if RAW_SECONDS.is_match(input) {
        if let Ok(seconds) = input.parse::<u32>() {
            if (1..=MAX_SECONDS).contains(&seconds) {
                return Some(seconds);
            }
        }
    }

    None
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_seconds(seconds: f64) -> u32 {
    // bounded by MAX_MINUTES * 60
    seconds.round() as u32
}

/// `MM:SS`, minutes unbounded
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Paused,
    Running,
    /// Reached zero; the countdown stopped and was restored to its duration
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    duration: u32,
    running: bool,
}

impl Default for Countdown {
    fn default() -> Self {
        Self {
            remaining: DEFAULT_DURATION_SECS,
            duration: DEFAULT_DURATION_SECS,
            running: false,
        }
    }
}

impl Countdown {
    #[cfg(test)]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn display(&self) -> String {
        format_time(self.remaining)
    }

    /// Start or pause; returns whether the countdown is now running
    pub fn toggle(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    /// Advance by one second
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Paused;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            self.remaining = self.duration;
            return TickOutcome::Finished;
        }
        TickOutcome::Running
    }

    /// Stop and restore the configured duration
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining = self.duration;
    }

    /// Replace the duration from user input. Invalid input changes nothing.
    pub fn set(&mut self, input: &str) -> bool {
        let Some(seconds) = parse_time_input(input) else {
            return false;
        };
        self.running = false;
        self.duration = seconds;
        self.remaining = seconds;
        true
    }
}
