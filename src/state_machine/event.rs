//! Events that can occur in a session

use crate::gateway::GatewayErrorKind;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Submit {
        text: String,
    },
    UpdateDraft {
        text: String,
    },
    Cancel,
    Retry,

    // Gateway events
    GatewayReply {
        request_id: u64,
        text: String,
    },
    GatewayFailed {
        request_id: u64,
        message: String,
        kind: GatewayErrorKind,
    },
}

impl Event {
    pub fn submit(text: impl Into<String>) -> Self {
        Event::Submit { text: text.into() }
    }

    pub fn update_draft(text: impl Into<String>) -> Self {
        Event::UpdateDraft { text: text.into() }
    }

    pub fn is_gateway_completion(&self) -> bool {
        matches!(self, Event::GatewayReply { .. } | Event::GatewayFailed { .. })
    }
}
