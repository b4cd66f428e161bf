//! Events that drive the coaching session

use crate::gateway::GatewayError;
use crate::state_machine::state::{MessageType, RequestId};

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // User intents
    SubmitProblem {
        name: String,
        context: String,
    },
    RequestAnotherHint,
    SendMessage {
        text: String,
    },
    QuickAction {
        kind: MessageType,
    },
    StartNewProblem,

    // Gateway events
    ResponseReceived {
        request_id: RequestId,
        text: String,
    },
    RequestFailed {
        request_id: RequestId,
        error: GatewayError,
    },
}

impl Event {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Event::SubmitProblem { .. } => "submit_problem",
            Event::RequestAnotherHint => "request_another_hint",
            Event::SendMessage { .. } => "send_message",
            Event::QuickAction { .. } => "quick_action",
            Event::StartNewProblem => "start_new_problem",
            Event::ResponseReceived { .. } => "response_received",
            Event::RequestFailed { .. } => "request_failed",
        }
    }
}
