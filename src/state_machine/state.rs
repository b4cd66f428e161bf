//! Coaching session state types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Message Types
// ============================================================================

/// Classification of a conversational turn.
///
/// Quick actions set it for the next outgoing message; the backend uses it
/// to pick a response style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    General,
    Hint,
    Analyze,
    Suggest,
    Explain,
    Optimize,
}

impl MessageType {
    pub const QUICK_ACTIONS: [MessageType; 5] = [
        MessageType::Hint,
        MessageType::Analyze,
        MessageType::Suggest,
        MessageType::Explain,
        MessageType::Optimize,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::General => "general",
            MessageType::Hint => "hint",
            MessageType::Analyze => "analyze",
            MessageType::Suggest => "suggest",
            MessageType::Explain => "explain",
            MessageType::Optimize => "optimize",
        }
    }

    /// Canned prompt sent when this kind is invoked as a quick action
    pub fn quick_action_prompt(self) -> &'static str {
        match self {
            MessageType::Hint => "Can you give me a hint for this problem?",
            MessageType::Analyze => "Can you analyze my approach or code?",
            MessageType::Suggest => "Can you suggest a different approach?",
            MessageType::Explain => "Can you explain the key concepts for this problem?",
            MessageType::Optimize => "How can I optimize my solution?",
            MessageType::General => "Can you help me with this problem?",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown message type: {0}")]
pub struct UnknownMessageType(pub String);

impl FromStr for MessageType {
    type Err = UnknownMessageType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(MessageType::General),
            "hint" => Ok(MessageType::Hint),
            "analyze" => Ok(MessageType::Analyze),
            "suggest" => Ok(MessageType::Suggest),
            "explain" => Ok(MessageType::Explain),
            "optimize" => Ok(MessageType::Optimize),
            other => Err(UnknownMessageType(other.to_string())),
        }
    }
}

// ============================================================================
// Turn Record
// ============================================================================

/// One logged exchange. Also the wire shape of a `conversationHistory` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRecord {
    pub user_input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub bot_response: String,
    #[serde(default)]
    pub message_type: MessageType,
}

/// Everything needed to log a turn once its response arrives
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingTurn {
    pub user_input: String,
    pub context: Option<String>,
    pub message_type: MessageType,
}

impl PendingTurn {
    pub fn complete(self, bot_response: String) -> TurnRecord {
        TurnRecord {
            user_input: self.user_input,
            context: self.context,
            bot_response,
            message_type: self.message_type,
        }
    }
}

/// Empty strings mean "no context" everywhere in the session
pub fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

// ============================================================================
// Session
// ============================================================================

/// The active problem and everything said about it so far
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Session {
    pub active_problem: String,
    pub active_context: String,
    pub history: Vec<TurnRecord>,
    pub pending_message_type: MessageType,
}

impl Session {
    pub fn is_active(&self) -> bool {
        !self.active_problem.is_empty()
    }
}

// ============================================================================
// Mode Controller
// ============================================================================

/// Identifies one issued request so late responses can be matched or dropped
pub type RequestId = u64;

/// Which request kind an outstanding reply belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    AnotherHint,
    Conversation,
}

/// UI mode; governs which intents are legal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mode {
    /// No active problem, problem entry is shown
    #[default]
    Idle,

    /// First hint request in flight, nothing committed yet
    AwaitingFirstHint {
        request_id: RequestId,
        problem: String,
        context: String,
    },

    /// Active problem, conversation surface shown
    Conversing,

    /// Another-hint or conversation request in flight
    AwaitingReply {
        request_id: RequestId,
        channel: Channel,
        pending: PendingTurn,
    },
}

/// Fieldless view of [`Mode`] for observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    Idle,
    AwaitingFirstHint,
    Conversing,
    AwaitingReply,
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Idle => ModeKind::Idle,
            Mode::AwaitingFirstHint { .. } => ModeKind::AwaitingFirstHint,
            Mode::Conversing => ModeKind::Conversing,
            Mode::AwaitingReply { .. } => ModeKind::AwaitingReply,
        }
    }

    /// The request this mode is waiting on, if any
    pub fn outstanding_request(&self) -> Option<RequestId> {
        match self {
            Mode::AwaitingFirstHint { request_id, .. } | Mode::AwaitingReply { request_id, .. } => {
                Some(*request_id)
            }
            Mode::Idle | Mode::Conversing => None,
        }
    }

    pub fn is_awaiting(&self) -> bool {
        self.outstanding_request().is_some()
    }
}

// ============================================================================
// Coach State
// ============================================================================

/// Complete orchestrator state: mode, session and request numbering.
///
/// `last_request_id` is never reset, so a response to a request from an
/// abandoned session cannot match a request of the current one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CoachState {
    pub mode: Mode,
    pub session: Session,
    pub last_request_id: RequestId,
}

impl CoachState {
    pub fn next_request_id(&self) -> RequestId {
        self.last_request_id + 1
    }

    /// Session/mode consistency: a session exists exactly when the mode is
    /// past the first hint, and history only exists inside a session.
    #[cfg(test)]
    pub fn is_consistent(&self) -> bool {
        let in_session = matches!(self.mode, Mode::Conversing | Mode::AwaitingReply { .. });
        if self.session.is_active() != in_session {
            return false;
        }
        self.session.is_active() || self.session.history.is_empty()
    }
}

/// Content-based recognition check against the hint service's fallback reply
pub fn is_unrecognized_problem(hint: &str) -> bool {
    hint.to_lowercase()
        .contains("i'm not familiar with that problem")
}
