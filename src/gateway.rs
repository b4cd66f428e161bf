//! Request gateway for the hint service
//!
//! Normalizes both endpoints into `Result<String, GatewayError>`. One attempt
//! per call; no caching, no retries.

mod error;
mod http;
mod types;

pub use error::GatewayError;
pub use http::HttpGateway;
pub use types::{ConversationRequest, HintRequest};

#[cfg(test)]
pub use error::UNREACHABLE_MESSAGE;
#[cfg(test)]
pub use types::RequestType;

use async_trait::async_trait;
use std::sync::Arc;

/// The two operations the coach needs from the hint service
#[async_trait]
pub trait HintGateway: Send + Sync {
    /// `POST /get_hint`, returns the hint text verbatim
    async fn request_hint(&self, request: &HintRequest) -> Result<String, GatewayError>;

    /// `POST /conversation`, returns the reply text verbatim
    async fn send_conversation_message(
        &self,
        request: &ConversationRequest,
    ) -> Result<String, GatewayError>;
}

#[async_trait]
impl<T: HintGateway + ?Sized> HintGateway for Arc<T> {
    async fn request_hint(&self, request: &HintRequest) -> Result<String, GatewayError> {
        (**self).request_hint(request).await
    }

    async fn send_conversation_message(
        &self,
        request: &ConversationRequest,
    ) -> Result<String, GatewayError> {
        (**self).send_conversation_message(request).await
    }
}

/// Logging wrapper for gateways
pub struct LoggingGateway<G> {
    inner: G,
}

impl<G: HintGateway> LoggingGateway<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }

    fn log_outcome(operation: &str, started: std::time::Instant, result: &Result<String, GatewayError>) {
        let duration = started.elapsed();
        match result {
            Ok(text) => {
                tracing::info!(
                    operation,
                    duration_ms = %duration.as_millis(),
                    response_len = text.len(),
                    "Hint service request completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    operation,
                    duration_ms = %duration.as_millis(),
                    error = %e,
                    transport = e.is_transport(),
                    "Hint service request failed"
                );
            }
        }
    }
}

#[async_trait]
impl<G: HintGateway> HintGateway for LoggingGateway<G> {
    async fn request_hint(&self, request: &HintRequest) -> Result<String, GatewayError> {
        let started = std::time::Instant::now();
        let result = self.inner.request_hint(request).await;
        Self::log_outcome("get_hint", started, &result);
        result
    }

    async fn send_conversation_message(
        &self,
        request: &ConversationRequest,
    ) -> Result<String, GatewayError> {
        let started = std::time::Instant::now();
        let result = self.inner.send_conversation_message(request).await;
        Self::log_outcome("conversation", started, &result);
        result
    }
}
