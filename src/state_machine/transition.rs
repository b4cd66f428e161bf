//! Pure state transition function
//!
//! Given the same state and event this always produces the same result; all
//! I/O is described by the returned effects and carried out by the runtime.

use super::effect::{Control, Render, Surface};
use super::state::{
    is_unrecognized_problem, non_empty, Channel, CoachState, MessageType, Mode, PendingTurn,
    RequestId, Session, TurnRecord,
};
use super::{Effect, Event};
use crate::gateway::{ConversationRequest, GatewayError, HintRequest};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: CoachState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: CoachState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Reasons an event is rejected. A rejection never changes state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Nothing to send")]
    EmptyInput,
    #[error("No current problem to discuss. Please start a new problem first.")]
    NoActiveProblem,
    #[error("A request is already in flight")]
    Busy,
    #[error("A problem is already active, start a new problem first")]
    SessionActive,
    #[error("Discarding response to request {request_id}, no longer awaited")]
    StaleResponse { request_id: RequestId },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
#[allow(clippy::too_many_lines)] // One arm per (mode, event) pair
pub fn transition(state: &CoachState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (&state.mode, event) {
        // ============================================================
        // Reset (legal from every mode)
        // ============================================================
        (mode, Event::StartNewProblem) => {
            let new_state = CoachState {
                mode: Mode::Idle,
                session: Session::default(),
                last_request_id: state.last_request_id,
            };
            let mut result = TransitionResult::new(new_state);
            if mode.is_awaiting() {
                result = result.with_effect(Effect::Render(Render::ClearLoading));
            }
            Ok(result
                .with_effect(Effect::show_surface(Surface::ProblemEntry))
                .with_effect(Effect::Render(Render::ClearInputs))
                .with_effect(Effect::enable(Control::ProblemInput, true))
                .with_effects(Effect::conversation_controls(true))
                .with_effect(Effect::PublishState))
        }

        // ============================================================
        // Problem submission
        // ============================================================
        (Mode::Idle, Event::SubmitProblem { name, context }) => {
            let name = name.trim();
            if name.is_empty() {
                return Err(TransitionError::EmptyInput);
            }
            let context = context.trim();
            let request_id = state.next_request_id();
            let new_state = CoachState {
                mode: Mode::AwaitingFirstHint {
                    request_id,
                    problem: name.to_string(),
                    context: context.to_string(),
                },
                session: state.session.clone(),
                last_request_id: request_id,
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::user_message(name))
                .with_effect(Effect::enable(Control::ProblemInput, false))
                .with_effect(Effect::Render(Render::ShowLoading))
                .with_effect(Effect::PublishState)
                .with_effect(Effect::RequestHint {
                    request_id,
                    request: HintRequest::first_hint(name, context),
                }))
        }

        (Mode::AwaitingFirstHint { .. }, Event::SubmitProblem { .. }) => {
            Err(TransitionError::Busy)
        }

        (Mode::Conversing | Mode::AwaitingReply { .. }, Event::SubmitProblem { .. }) => {
            Err(TransitionError::SessionActive)
        }

        // ============================================================
        // Conversation intents
        // ============================================================
        (_, Event::SendMessage { text }) if text.trim().is_empty() => {
            Err(TransitionError::EmptyInput)
        }

        (
            _,
            Event::RequestAnotherHint | Event::SendMessage { .. } | Event::QuickAction { .. },
        ) if !state.session.is_active() => Err(TransitionError::NoActiveProblem),

        (Mode::Conversing, Event::RequestAnotherHint) => {
            let session = &state.session;
            let request_id = state.next_request_id();
            let pending = PendingTurn {
                user_input: session.active_problem.clone(),
                context: non_empty(&session.active_context),
                message_type: MessageType::General,
            };
            let request = HintRequest::another_hint(
                &session.active_problem,
                &session.active_context,
                session.history.clone(),
            );
            let new_state = CoachState {
                mode: Mode::AwaitingReply {
                    request_id,
                    channel: Channel::AnotherHint,
                    pending,
                },
                session: session.clone(),
                last_request_id: request_id,
            };
            Ok(TransitionResult::new(new_state)
                .with_effects(Effect::conversation_controls(false))
                .with_effect(Effect::Render(Render::ShowLoading))
                .with_effect(Effect::PublishState)
                .with_effect(Effect::RequestHint {
                    request_id,
                    request,
                }))
        }

        (Mode::Conversing, Event::SendMessage { text }) => {
            let message_type = state.session.pending_message_type;
            Ok(start_conversation(state, state.session.clone(), text.trim(), message_type))
        }

        (Mode::Conversing, Event::QuickAction { kind }) => {
            let session = Session {
                pending_message_type: kind,
                ..state.session.clone()
            };
            Ok(start_conversation(state, session, kind.quick_action_prompt(), kind))
        }

        (
            Mode::AwaitingReply { .. },
            Event::RequestAnotherHint | Event::SendMessage { .. } | Event::QuickAction { .. },
        ) => Err(TransitionError::Busy),

        // ============================================================
        // Responses
        // ============================================================
        (mode, Event::ResponseReceived { request_id, .. } | Event::RequestFailed { request_id, .. })
            if mode.outstanding_request() != Some(request_id) =>
        {
            Err(TransitionError::StaleResponse { request_id })
        }

        (Mode::AwaitingFirstHint { problem, context, .. }, Event::ResponseReceived { text, .. }) => {
            Ok(first_hint_received(state, problem, context, text))
        }

        (Mode::AwaitingFirstHint { .. }, Event::RequestFailed { error, .. }) => {
            let new_state = CoachState {
                mode: Mode::Idle,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::Render(Render::ClearLoading))
                .with_effect(error_message(&error))
                .with_effect(Effect::enable(Control::ProblemInput, true))
                .with_effect(Effect::PublishState))
        }

        (Mode::AwaitingReply { channel, pending, .. }, Event::ResponseReceived { text, .. }) => {
            let record = pending.clone().complete(text);
            let mut session = state.session.clone();
            if *channel == Channel::Conversation {
                session.pending_message_type = MessageType::General;
            }
            let shown = Effect::coach_message(record.bot_response.clone(), record.message_type);
            session.history.push(record);
            let new_state = CoachState {
                mode: Mode::Conversing,
                session,
                last_request_id: state.last_request_id,
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::Render(Render::ClearLoading))
                .with_effect(shown)
                .with_effects(Effect::conversation_controls(true))
                .with_effect(Effect::PublishState))
        }

        (Mode::AwaitingReply { channel, .. }, Event::RequestFailed { error, .. }) => {
            let mut session = state.session.clone();
            if *channel == Channel::Conversation {
                session.pending_message_type = MessageType::General;
            }
            let new_state = CoachState {
                mode: Mode::Conversing,
                session,
                last_request_id: state.last_request_id,
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::Render(Render::ClearLoading))
                .with_effect(error_message(&error))
                .with_effects(Effect::conversation_controls(true))
                .with_effect(Effect::PublishState))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (mode, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {:?} with event {}",
            mode.kind(),
            event.name()
        ))),
    }
}

// Helper functions

fn start_conversation(
    state: &CoachState,
    session: Session,
    text: &str,
    message_type: MessageType,
) -> TransitionResult {
    let request_id = state.next_request_id();
    let request = ConversationRequest {
        message: text.to_string(),
        problem_name: session.active_problem.clone(),
        conversation_history: session.history.clone(),
        message_type,
    };
    let new_state = CoachState {
        mode: Mode::AwaitingReply {
            request_id,
            channel: Channel::Conversation,
            pending: PendingTurn {
                user_input: text.to_string(),
                context: None,
                message_type,
            },
        },
        session,
        last_request_id: request_id,
    };
    TransitionResult::new(new_state)
        .with_effect(Effect::user_message(text))
        .with_effects(Effect::conversation_controls(false))
        .with_effect(Effect::Render(Render::ShowLoading))
        .with_effect(Effect::PublishState)
        .with_effect(Effect::SendConversation {
            request_id,
            request,
        })
}

fn first_hint_received(
    state: &CoachState,
    problem: &str,
    context: &str,
    text: String,
) -> TransitionResult {
    if is_unrecognized_problem(&text) {
        // Nothing is committed; the user gets the entry form back
        let new_state = CoachState {
            mode: Mode::Idle,
            ..state.clone()
        };
        return TransitionResult::new(new_state)
            .with_effect(Effect::Render(Render::ClearLoading))
            .with_effect(Effect::coach_message(text, MessageType::General))
            .with_effect(Effect::show_surface(Surface::ProblemEntry))
            .with_effect(Effect::Render(Render::ClearInputs))
            .with_effect(Effect::enable(Control::ProblemInput, true))
            .with_effect(Effect::PublishState);
    }

    let record = TurnRecord {
        user_input: problem.to_string(),
        context: non_empty(context),
        bot_response: text,
        message_type: MessageType::Hint,
    };
    let shown = Effect::coach_message(record.bot_response.clone(), record.message_type);
    let new_state = CoachState {
        mode: Mode::Conversing,
        session: Session {
            active_problem: problem.to_string(),
            active_context: context.to_string(),
            history: vec![record],
            pending_message_type: MessageType::General,
        },
        last_request_id: state.last_request_id,
    };
    TransitionResult::new(new_state)
        .with_effect(Effect::Render(Render::ClearLoading))
        .with_effect(shown)
        .with_effect(Effect::show_surface(Surface::Conversation))
        .with_effect(Effect::enable(Control::ProblemInput, true))
        .with_effects(Effect::conversation_controls(true))
        .with_effect(Effect::PublishState)
}

fn error_message(error: &GatewayError) -> Effect {
    Effect::system_message(error.user_message())
}
