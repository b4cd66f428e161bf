//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across arbitrary event sequences.

use super::state::*;
use super::transition::*;
use super::*;
use crate::gateway::GatewayError;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_message_type() -> impl Strategy<Value = MessageType> {
    prop_oneof![
        Just(MessageType::General),
        Just(MessageType::Hint),
        Just(MessageType::Analyze),
        Just(MessageType::Suggest),
        Just(MessageType::Explain),
        Just(MessageType::Optimize),
    ]
}

fn arb_gateway_error() -> impl Strategy<Value = GatewayError> {
    prop_oneof![
        "[a-zA-Z ]{1,30}".prop_map(GatewayError::backend),
        "[a-z ]{1,20}".prop_map(GatewayError::transport),
    ]
}

fn arb_reply_text() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-zA-Z ?]{1,40}",
        1 => Just("I'm not familiar with that problem. Please check the spelling.".to_string()),
    ]
}

/// Abstract step; responses are bound to a concrete request id at run time
#[derive(Debug, Clone)]
enum Step {
    Submit(String),
    AnotherHint,
    Send(String),
    Quick(MessageType),
    Reset,
    Respond(String),
    Fail(GatewayError),
    RespondStale(String),
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        1 => "[a-zA-Z ]{0,12}".prop_map(Step::Submit),
        1 => Just(Step::AnotherHint),
        1 => "[a-zA-Z ]{0,12}".prop_map(Step::Send),
        1 => arb_message_type().prop_map(Step::Quick),
        1 => Just(Step::Reset),
        3 => arb_reply_text().prop_map(Step::Respond),
        1 => arb_gateway_error().prop_map(Step::Fail),
        1 => arb_reply_text().prop_map(Step::RespondStale),
    ]
}

fn to_event(state: &CoachState, step: Step) -> Event {
    let pending = state.mode.outstanding_request().unwrap_or(state.last_request_id);
    match step {
        Step::Submit(name) => Event::SubmitProblem {
            name,
            context: String::new(),
        },
        Step::AnotherHint => Event::RequestAnotherHint,
        Step::Send(text) => Event::SendMessage { text },
        Step::Quick(kind) => Event::QuickAction { kind },
        Step::Reset => Event::StartNewProblem,
        Step::Respond(text) => Event::ResponseReceived {
            request_id: pending,
            text,
        },
        Step::Fail(error) => Event::RequestFailed {
            request_id: pending,
            error,
        },
        Step::RespondStale(text) => Event::ResponseReceived {
            request_id: pending + 1000,
            text,
        },
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Session/mode consistency holds after every accepted transition
    #[test]
    fn prop_state_stays_consistent(steps in proptest::collection::vec(arb_step(), 1..40)) {
        let mut state = CoachState::default();
        for step in steps {
            let event = to_event(&state, step);
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
            }
            prop_assert!(state.is_consistent(), "inconsistent state: {:?}", state);
        }
    }

    /// History only grows by appending, one record at a time, except on reset
    #[test]
    fn prop_history_is_append_only(steps in proptest::collection::vec(arb_step(), 1..40)) {
        let mut state = CoachState::default();
        for step in steps {
            let is_reset = matches!(step, Step::Reset);
            let event = to_event(&state, step);
            let before = state.session.history.clone();
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
            }
            let after = &state.session.history;
            if is_reset {
                prop_assert!(after.is_empty());
            } else if after.len() >= before.len() {
                prop_assert!(after.len() - before.len() <= 1);
                prop_assert_eq!(&after[..before.len()], &before[..]);
            } else {
                // Only an unrecognized first hint can leave an empty history,
                // and that never follows a non-empty one
                prop_assert!(false, "history shrank without reset");
            }
        }
    }

    /// Request ids strictly increase and every issued request is awaited
    #[test]
    fn prop_request_ids_increase(steps in proptest::collection::vec(arb_step(), 1..40)) {
        let mut state = CoachState::default();
        for step in steps {
            let event = to_event(&state, step);
            if let Ok(result) = transition(&state, event) {
                for effect in &result.effects {
                    if let Effect::RequestHint { request_id, .. }
                    | Effect::SendConversation { request_id, .. } = effect
                    {
                        prop_assert_eq!(*request_id, state.last_request_id + 1);
                        prop_assert_eq!(
                            result.new_state.mode.outstanding_request(),
                            Some(*request_id)
                        );
                    }
                }
                prop_assert!(result.new_state.last_request_id >= state.last_request_id);
                state = result.new_state;
            }
        }
    }

    /// At most one request is issued per accepted transition, and never while one is outstanding
    #[test]
    fn prop_single_flight(steps in proptest::collection::vec(arb_step(), 1..40)) {
        let mut state = CoachState::default();
        for step in steps {
            let was_awaiting = state.mode.is_awaiting();
            let event = to_event(&state, step);
            if let Ok(result) = transition(&state, event) {
                let issued = result
                    .effects
                    .iter()
                    .filter(|e| matches!(e, Effect::RequestHint { .. } | Effect::SendConversation { .. }))
                    .count();
                prop_assert!(issued <= 1);
                if was_awaiting {
                    prop_assert_eq!(issued, 0);
                }
                state = result.new_state;
            }
        }
    }

    /// Stale responses are always rejected
    #[test]
    fn prop_stale_responses_rejected(
        steps in proptest::collection::vec(arb_step(), 0..20),
        text in arb_reply_text(),
    ) {
        let mut state = CoachState::default();
        for step in steps {
            let event = to_event(&state, step);
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
            }
        }
        let stale = state.last_request_id + 1;
        let result = transition(&state, Event::ResponseReceived { request_id: stale, text });
        let is_stale = matches!(result, Err(TransitionError::StaleResponse { .. }));
        prop_assert!(is_stale);
    }

    /// Reset always yields the pristine session regardless of prior mode
    #[test]
    fn prop_reset_is_complete(steps in proptest::collection::vec(arb_step(), 0..30)) {
        let mut state = CoachState::default();
        for step in steps {
            let event = to_event(&state, step);
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
            }
        }
        let result = transition(&state, Event::StartNewProblem).unwrap();
        prop_assert_eq!(result.new_state.mode, Mode::Idle);
        prop_assert_eq!(result.new_state.session, Session::default());
        prop_assert_eq!(result.new_state.last_request_id, state.last_request_id);
    }
}
