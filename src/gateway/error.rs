//! Gateway error types

use thiserror::Error;

/// Shown for every transport failure; the detail only goes to the log
pub const UNREACHABLE_MESSAGE: &str =
    "Oops! I couldn't reach the server. Please ensure the backend is running.";

/// Used when an error response carries no usable `error` field
pub const GENERIC_BACKEND_MESSAGE: &str = "Something went wrong.";

/// Failure of a single gateway call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The server answered but rejected the request
    #[error("{message}")]
    Backend { message: String },
    /// No usable response was obtained
    #[error("could not reach server: {detail}")]
    Transport { detail: String },
}

impl GatewayError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }

    /// Build a backend error from a non-success response body
    pub fn from_error_body(body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or_else(|| GENERIC_BACKEND_MESSAGE.to_string());
        Self::backend(message)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Text shown to the user in the conversation
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend { message } => format!("Error: {message}"),
            Self::Transport { .. } => UNREACHABLE_MESSAGE.to_string(),
        }
    }
}
