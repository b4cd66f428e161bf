//! Runtime for driving a coaching session
//!
//! One task owns the [`CoachState`]; intents and gateway responses reach it
//! through a single inbox and are applied one at a time.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::CoachRuntime;

use crate::gateway::HintGateway;
use crate::state_machine::{CoachState, Event, MessageType, ModeKind, Render, TransitionError};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// Events sent to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    Render(Render),
    ModeChanged(ModeKind),
}

/// Why an intent did not take effect
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("Coach runtime has stopped")]
    RuntimeStopped,
}

/// An event on its way into the runtime, with an optional acknowledgement
#[derive(Debug)]
pub(crate) struct Envelope {
    pub event: Event,
    pub ack: Option<oneshot::Sender<Result<(), TransitionError>>>,
}

impl Envelope {
    pub fn internal(event: Event) -> Self {
        Self { event, ack: None }
    }
}

/// Handle to interact with a running coaching session
#[derive(Clone)]
pub struct CoachHandle {
    event_tx: mpsc::Sender<Envelope>,
    broadcast_tx: broadcast::Sender<RenderEvent>,
    state_rx: watch::Receiver<CoachState>,
}

impl CoachHandle {
    /// Start a runtime for `gateway` on the current tokio runtime
    pub fn spawn<G: HintGateway + 'static>(gateway: G) -> (Self, JoinHandle<()>) {
        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(256);
        let (state_tx, state_rx) = watch::channel(CoachState::default());

        let runtime = CoachRuntime::new(
            Arc::new(gateway),
            event_rx,
            event_tx.downgrade(),
            broadcast_tx.clone(),
            state_tx,
        );
        let task = tokio::spawn(runtime.run());

        (
            Self {
                event_tx,
                broadcast_tx,
                state_rx,
            },
            task,
        )
    }

    pub async fn submit_problem(
        &self,
        name: impl Into<String>,
        context: impl Into<String>,
    ) -> Result<(), IntentError> {
        self.dispatch(Event::SubmitProblem {
            name: name.into(),
            context: context.into(),
        })
        .await
    }

    pub async fn request_another_hint(&self) -> Result<(), IntentError> {
        self.dispatch(Event::RequestAnotherHint).await
    }

    pub async fn send_message(&self, text: impl Into<String>) -> Result<(), IntentError> {
        self.dispatch(Event::SendMessage { text: text.into() }).await
    }

    pub async fn invoke_quick_action(&self, kind: MessageType) -> Result<(), IntentError> {
        self.dispatch(Event::QuickAction { kind }).await
    }

    pub async fn start_new_problem(&self) -> Result<(), IntentError> {
        self.dispatch(Event::StartNewProblem).await
    }

    /// Subscribe to render instructions; only events sent afterwards are seen
    pub fn subscribe(&self) -> broadcast::Receiver<RenderEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Current state as last published by the runtime
    pub fn snapshot(&self) -> CoachState {
        self.state_rx.borrow().clone()
    }

    /// Wait until the published state satisfies `predicate`
    #[cfg(test)]
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&CoachState) -> bool,
    ) -> Result<CoachState, IntentError> {
        let mut state_rx = self.state_rx.clone();
        let state = state_rx
            .wait_for(predicate)
            .await
            .map_err(|_| IntentError::RuntimeStopped)?;
        Ok(state.clone())
    }

    /// Send an intent and wait for the runtime to accept or reject it
    async fn dispatch(&self, event: Event) -> Result<(), IntentError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.event_tx
            .send(Envelope {
                event,
                ack: Some(ack_tx),
            })
            .await
            .map_err(|_| IntentError::RuntimeStopped)?;
        ack_rx.await.map_err(|_| IntentError::RuntimeStopped)??;
        Ok(())
    }
}
