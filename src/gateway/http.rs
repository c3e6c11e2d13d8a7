//! HTTP backend gateway

use super::types::{ChatMessage, ChatReply, ChatRequest};
use super::{Gateway, GatewayError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Talks to one advisory backend over JSON/HTTP
pub struct HttpGateway {
    client: Client,
    endpoint: String,
    name: String,
}

impl HttpGateway {
    /// `base_url` is the domain's backend root; requests go to `{base_url}/chat`
    pub fn new(name: impl Into<String>, base_url: &str) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat", base_url.trim_end_matches('/')),
            name: name.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn classify_status(status: StatusCode, body: &str) -> GatewayError {
    match status.as_u16() {
        400 => GatewayError::invalid_request(format!("Invalid request: {body}")),
        401 | 403 => GatewayError::auth(format!("Authentication failed: {body}")),
        408 | 504 => GatewayError::timeout(format!("Backend timed out: {body}")),
        429 => GatewayError::rate_limit(format!("Rate limited: {body}")),
        500..=599 => GatewayError::server_error(format!("Server error: {body}")),
        _ => GatewayError::unknown(format!("HTTP {status}: {body}")),
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn chat(&self, history: &[ChatMessage]) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { messages: history })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::timeout(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    GatewayError::network(format!("Connection failed: {e}"))
                } else {
                    GatewayError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        let reply: ChatReply = serde_json::from_str(&body).map_err(|e| {
            GatewayError::invalid_request(format!("Failed to parse reply: {e} - body: {body}"))
        })?;

        Ok(reply.reply)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
