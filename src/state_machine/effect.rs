//! Effects produced by state transitions

use crate::gateway::{ConversationRequest, HintRequest};
use crate::state_machine::state::{MessageType, RequestId};
use serde::Serialize;

/// Who a chat line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Coach,
    /// Failure reported in place of a coach reply
    System,
}

/// Top-level UI surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    ProblemEntry,
    Conversation,
}

/// Controls whose enablement the core toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    ProblemInput,
    ConversationInput,
    AnotherHint,
}

/// Instructions for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Render {
    AppendMessage {
        sender: Sender,
        text: String,
        message_type: MessageType,
    },
    ShowLoading,
    ClearLoading,
    ShowSurface { surface: Surface },
    SetEnabled { control: Control, enabled: bool },
    ClearInputs,
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Publish the new state to observers
    PublishState,

    /// Call the hint endpoint
    RequestHint {
        request_id: RequestId,
        request: HintRequest,
    },

    /// Call the conversation endpoint
    SendConversation {
        request_id: RequestId,
        request: ConversationRequest,
    },

    /// Forward a render instruction to the presentation layer
    Render(Render),
}

impl Effect {
    pub fn user_message(text: impl Into<String>) -> Self {
        Effect::Render(Render::AppendMessage {
            sender: Sender::User,
            text: text.into(),
            message_type: MessageType::General,
        })
    }

    pub fn coach_message(text: impl Into<String>, message_type: MessageType) -> Self {
        Effect::Render(Render::AppendMessage {
            sender: Sender::Coach,
            text: text.into(),
            message_type,
        })
    }

    pub fn system_message(text: impl Into<String>) -> Self {
        Effect::Render(Render::AppendMessage {
            sender: Sender::System,
            text: text.into(),
            message_type: MessageType::General,
        })
    }

    pub fn enable(control: Control, enabled: bool) -> Self {
        Effect::Render(Render::SetEnabled { control, enabled })
    }

    pub fn show_surface(surface: Surface) -> Self {
        Effect::Render(Render::ShowSurface { surface })
    }

    /// Enable or disable everything used while conversing
    pub fn conversation_controls(enabled: bool) -> [Self; 2] {
        [
            Self::enable(Control::ConversationInput, enabled),
            Self::enable(Control::AnotherHint, enabled),
        ]
    }
}
