//! Wire types for advisory backend requests

use serde::{Deserialize, Serialize};

/// Author of a message sent to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    System,
}

/// One conversational turn as the backend sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Request body for `POST .../chat`
#[derive(Debug, Serialize)]
pub(super) struct ChatRequest<'a> {
    pub messages: &'a [ChatMessage],
}

/// Response body for `POST .../chat`
#[derive(Debug, Deserialize)]
pub(super) struct ChatReply {
    pub reply: String,
}
