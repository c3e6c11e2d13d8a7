//! Advisory backend abstraction
//!
//! A gateway maps conversation history to a single reply string. One gateway
//! is injected into each session at construction.

mod error;
mod http;
mod registry;
mod types;

pub use error::{GatewayError, GatewayErrorKind};
pub use http::HttpGateway;
pub use registry::GatewayRegistry;
pub use types::ChatMessage;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for advisory backends
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Ask the backend for a reply to `history` (oldest first)
    async fn chat(&self, history: &[ChatMessage]) -> Result<String, GatewayError>;

    /// Name used in logs
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: Gateway + ?Sized> Gateway for Arc<T> {
    async fn chat(&self, history: &[ChatMessage]) -> Result<String, GatewayError> {
        (**self).chat(history).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Logging wrapper for gateways
pub struct LoggingGateway {
    inner: Arc<dyn Gateway>,
    name: String,
}

impl LoggingGateway {
    pub fn new(inner: Arc<dyn Gateway>) -> Self {
        let name = inner.name().to_string();
        Self { inner, name }
    }
}

#[async_trait]
impl Gateway for LoggingGateway {
    async fn chat(&self, history: &[ChatMessage]) -> Result<String, GatewayError> {
        let start = std::time::Instant::now();
        let result = self.inner.chat(history).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    gateway = %self.name,
                    duration_ms = %duration.as_millis(),
                    turns = history.len(),
                    reply_chars = reply.chars().count(),
                    "Gateway request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    gateway = %self.name,
                    duration_ms = %duration.as_millis(),
                    turns = history.len(),
                    error = %e.message,
                    kind = ?e.kind,
                    "Gateway request failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}
