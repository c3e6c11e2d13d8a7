//! Effects produced by state transitions

use crate::gateway::{ChatMessage, GatewayErrorKind};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the gateway for a reply (spawns as background task)
    CallGateway {
        request_id: u64,
        history: Vec<ChatMessage>,
    },

    /// Abort the outstanding gateway call
    AbortGateway,

    /// Record a failed gateway call for diagnostics
    ReportFailure {
        request_id: u64,
        message: String,
        kind: GatewayErrorKind,
    },

    /// The log changed; push a fresh snapshot to connected clients
    NotifyClient,
}

impl Effect {
    pub fn call_gateway(request_id: u64, history: Vec<ChatMessage>) -> Self {
        Effect::CallGateway {
            request_id,
            history,
        }
    }
}
