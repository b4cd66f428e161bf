//! HTTP/JSON client for the hint service

use super::types::{ConversationRequest, ConversationResponse, HintRequest, HintResponse};
use super::{GatewayError, HintGateway};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Gateway talking to the hint service over HTTP
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// `timeout` of `None` lets requests run to completion
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, GatewayError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::transport(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    GatewayError::transport(format!("Connection failed: {e}"))
                } else {
                    GatewayError::transport(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "Hint service returned an error status");
            return Err(GatewayError::from_error_body(&body));
        }

        serde_json::from_str(&body)
            .map_err(|e| GatewayError::transport(format!("Failed to parse response: {e}")))
    }
}

#[async_trait]
impl HintGateway for HttpGateway {
    async fn request_hint(&self, request: &HintRequest) -> Result<String, GatewayError> {
        let response: HintResponse = self.post("/get_hint", request).await?;
        Ok(response.hint)
    }

    async fn send_conversation_message(
        &self,
        request: &ConversationRequest,
    ) -> Result<String, GatewayError> {
        let response: ConversationResponse = self.post("/conversation", request).await?;
        Ok(response.response)
    }
}
