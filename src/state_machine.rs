//! Core coaching session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Control, Effect, Render, Sender, Surface};
pub use event::Event;
pub use state::{CoachState, MessageType, ModeKind};
pub use transition::{transition, TransitionError};
