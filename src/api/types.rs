//! API request and response types

use crate::app::AppView;
use crate::runtime::SessionSnapshot;
use serde::{Deserialize, Serialize};

/// Request to log in with the principal the browser obtained
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub credential: String,
}

/// Request carrying the chat input text (submit or draft)
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// Response after selecting a domain
#[derive(Debug, Serialize)]
pub struct SelectDomainResponse {
    pub app: AppView,
    pub session: SessionSnapshot,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
