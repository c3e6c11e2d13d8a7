//! Gateway error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gateway error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Timeout, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Server, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::InvalidRequest, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Unknown, message)
    }
}

/// Error classification, used to pick the notice shown in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorKind {
    /// Connection refused, DNS, reset
    Network,
    /// No reply within the configured deadline
    Timeout,
    /// 429
    RateLimit,
    /// 5xx
    Server,
    /// 401, 403
    Auth,
    /// 400, or a reply body we could not understand
    InvalidRequest,
    Unknown,
}

impl GatewayErrorKind {
    /// Text of the failed turn that replaces the placeholder
    pub fn user_notice(self) -> &'static str {
        match self {
            Self::Network => {
                "Could not reach the advisor. Check your connection and try again."
            }
            Self::Timeout => "The advisor took too long to respond. Please try again.",
            Self::RateLimit => "The advisor is busy right now. Please wait a moment and try again.",
            Self::Auth => "The advisor refused the request. Please sign in again.",
            Self::Server | Self::InvalidRequest | Self::Unknown => {
                "The advisor could not answer right now. Please try again."
            }
        }
    }
}
