//! Wire types for the hint service endpoints

use crate::state_machine::state::{MessageType, TurnRecord};
use serde::{Deserialize, Serialize};

/// Which hint the client is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    #[default]
    FirstHint,
    AnotherHint,
}

/// Body of `POST /get_hint`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintRequest {
    pub problem_name: String,
    #[serde(default)]
    pub request_type: RequestType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conversation_history: Vec<TurnRecord>,
}

impl HintRequest {
    pub fn first_hint(problem_name: &str, context: &str) -> Self {
        Self {
            problem_name: problem_name.to_string(),
            request_type: RequestType::FirstHint,
            context: context.to_string(),
            conversation_history: Vec::new(),
        }
    }

    pub fn another_hint(problem_name: &str, context: &str, history: Vec<TurnRecord>) -> Self {
        Self {
            problem_name: problem_name.to_string(),
            request_type: RequestType::AnotherHint,
            context: context.to_string(),
            conversation_history: history,
        }
    }
}

/// Body of `POST /conversation`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRequest {
    pub message: String,
    pub problem_name: String,
    #[serde(default)]
    pub conversation_history: Vec<TurnRecord>,
    #[serde(default)]
    pub message_type: MessageType,
}

/// Success body of `POST /get_hint`
#[derive(Debug, Deserialize)]
pub(crate) struct HintResponse {
    pub hint: String,
}

/// Success body of `POST /conversation`
#[derive(Debug, Deserialize)]
pub(crate) struct ConversationResponse {
    pub response: String,
}
