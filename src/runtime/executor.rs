//! Coaching session runtime executor

use super::{Envelope, RenderEvent};
use crate::gateway::HintGateway;
use crate::state_machine::{transition, CoachState, Effect, Event, TransitionError};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

/// Owns the session state and executes the effects of each transition
pub struct CoachRuntime<G>
where
    G: HintGateway + 'static,
{
    state: CoachState,
    gateway: Arc<G>,
    event_rx: mpsc::Receiver<Envelope>,
    /// Weak so the runtime stops once every handle is dropped
    event_tx: mpsc::WeakSender<Envelope>,
    broadcast_tx: broadcast::Sender<RenderEvent>,
    state_tx: watch::Sender<CoachState>,
}

impl<G> CoachRuntime<G>
where
    G: HintGateway + 'static,
{
    pub fn new(
        gateway: Arc<G>,
        event_rx: mpsc::Receiver<Envelope>,
        event_tx: mpsc::WeakSender<Envelope>,
        broadcast_tx: broadcast::Sender<RenderEvent>,
        state_tx: watch::Sender<CoachState>,
    ) -> Self {
        Self {
            state: CoachState::default(),
            gateway,
            event_rx,
            event_tx,
            broadcast_tx,
            state_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Starting coach runtime");

        while let Some(envelope) = self.event_rx.recv().await {
            self.process_event(envelope);
        }

        tracing::info!("Coach runtime stopped");
    }

    fn process_event(&mut self, envelope: Envelope) {
        let Envelope { event, ack } = envelope;
        let event_name = event.name();

        let outcome = match transition(&self.state, event) {
            Ok(result) => {
                tracing::debug!(
                    event = event_name,
                    from = ?self.state.mode.kind(),
                    to = ?result.new_state.mode.kind(),
                    "Transition"
                );
                self.state = result.new_state;
                for effect in result.effects {
                    self.execute_effect(effect);
                }
                Ok(())
            }
            Err(e @ TransitionError::StaleResponse { .. }) => {
                tracing::info!(error = %e, "Dropping response");
                Err(e)
            }
            Err(e) => {
                // Rejected intents are no-ops
                tracing::debug!(event = event_name, error = %e, "Intent rejected");
                Err(e)
            }
        };

        if let Some(ack) = ack {
            let _ = ack.send(outcome);
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::PublishState => {
                self.state_tx.send_replace(self.state.clone());
                let _ = self
                    .broadcast_tx
                    .send(RenderEvent::ModeChanged(self.state.mode.kind()));
            }

            Effect::Render(render) => {
                let _ = self.broadcast_tx.send(RenderEvent::Render(render));
            }

            Effect::RequestHint {
                request_id,
                request,
            } => {
                let Some(event_tx) = self.event_tx.upgrade() else {
                    tracing::warn!(request_id, "No handles left, not requesting hint");
                    return;
                };
                let gateway = self.gateway.clone();

                tokio::spawn(async move {
                    tracing::info!(
                        request_id,
                        request_type = ?request.request_type,
                        "Requesting hint (background)"
                    );
                    let event = match gateway.request_hint(&request).await {
                        Ok(text) => Event::ResponseReceived { request_id, text },
                        Err(error) => Event::RequestFailed { request_id, error },
                    };
                    let _ = event_tx.send(Envelope::internal(event)).await;
                });
            }

            Effect::SendConversation {
                request_id,
                request,
            } => {
                let Some(event_tx) = self.event_tx.upgrade() else {
                    tracing::warn!(request_id, "No handles left, not sending message");
                    return;
                };
                let gateway = self.gateway.clone();

                tokio::spawn(async move {
                    tracing::info!(
                        request_id,
                        message_type = %request.message_type,
                        history_len = request.conversation_history.len(),
                        "Sending conversation message (background)"
                    );
                    let event = match gateway.send_conversation_message(&request).await {
                        Ok(text) => Event::ResponseReceived { request_id, text },
                        Err(error) => Event::RequestFailed { request_id, error },
                    };
                    let _ = event_tx.send(Envelope::internal(event)).await;
                });
            }
        }
    }
}
