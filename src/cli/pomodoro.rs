//! Wall-clock driver for the pomodoro [`Countdown`]

use crate::timer::{Countdown, TickOutcome};
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

const TICK: Duration = Duration::from_secs(1);

pub struct Pomodoro {
    countdown: Countdown,
    ticker: Interval,
}

impl Pomodoro {
    /// Must be called inside the tokio runtime
    pub fn new() -> Self {
        let mut ticker = interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            countdown: Countdown::default(),
            ticker,
        }
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn is_running(&self) -> bool {
        self.countdown.is_running()
    }

    /// Start or resume. The first second is counted from now.
    pub fn start(&mut self) {
        if !self.countdown.is_running() {
            self.countdown.toggle();
            self.ticker.reset();
        }
    }

    pub fn pause(&mut self) {
        if self.countdown.is_running() {
            self.countdown.toggle();
        }
    }

    pub fn reset(&mut self) {
        self.countdown.reset();
    }

    pub fn set(&mut self, input: &str) -> bool {
        self.countdown.set(input)
    }

    /// Wait for the next second and count it down. Only poll while running.
    pub async fn tick(&mut self) -> TickOutcome {
        self.ticker.tick().await;
        self.countdown.tick()
    }
}
