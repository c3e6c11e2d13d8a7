//! Session state types

use crate::domain::Domain;
use crate::gateway::ChatMessage;
use serde::{Deserialize, Serialize};

// ============================================================================
// Turns
// ============================================================================

/// One entry of the conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Turn {
    /// Authored by the human
    User { content: String },
    /// Authored by the backend, or the seeded greeting
    System { content: String },
    /// Placeholder while the backend call is outstanding
    Pending { content: String },
    /// Notice that replaced a placeholder whose request failed or was cancelled
    Failed { content: String },
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Turn::User {
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Turn::System {
            content: content.into(),
        }
    }

    pub fn pending(content: impl Into<String>) -> Self {
        Turn::Pending {
            content: content.into(),
        }
    }

    pub fn failed(content: impl Into<String>) -> Self {
        Turn::Failed {
            content: content.into(),
        }
    }

    #[cfg(test)]
    pub fn content(&self) -> &str {
        match self {
            Turn::User { content }
            | Turn::System { content }
            | Turn::Pending { content }
            | Turn::Failed { content } => content,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Turn::Pending { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Turn::Failed { .. })
    }

    /// Wire form for the backend. Pending and failed turns are local only.
    pub fn to_chat_message(&self) -> Option<ChatMessage> {
        match self {
            Turn::User { content } => Some(ChatMessage::user(content.clone())),
            Turn::System { content } => Some(ChatMessage::system(content.clone())),
            Turn::Pending { .. } | Turn::Failed { .. } => None,
        }
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Whether a backend call is outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionPhase {
    /// Ready for a submission
    #[default]
    Idle,

    /// Request `request_id` is in flight; the log ends with its pending turn
    AwaitingResponse { request_id: u64 },
}

/// State of one advisory conversation
///
/// Invariants, maintained by [`super::transition`]:
/// - `log[0]` is the seeded greeting
/// - the phase is `AwaitingResponse` iff the last turn is `Pending`
/// - at most one `Pending` turn exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub(super) log: Vec<Turn>,
    pub(super) draft: String,
    pub(super) phase: SessionPhase,
    /// Id of the most recently issued request
    pub(super) last_request_id: u64,
}

impl SessionState {
    /// Fresh session: the greeting and nothing else
    pub fn new(context: &SessionContext) -> Self {
        Self {
            log: vec![Turn::system(context.greeting.clone())],
            draft: String::new(),
            phase: SessionPhase::Idle,
            last_request_id: 0,
        }
    }

    pub fn log(&self) -> &[Turn] {
        &self.log
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    #[cfg(test)]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn awaiting_response(&self) -> bool {
        matches!(self.phase, SessionPhase::AwaitingResponse { .. })
    }

    /// Everything after the greeting that the backend should see
    pub fn history(&self) -> Vec<ChatMessage> {
        self.log
            .iter()
            .skip(1)
            .filter_map(Turn::to_chat_message)
            .collect()
    }

    pub(super) fn next_request_id(&mut self) -> u64 {
        self.last_request_id += 1;
        self.last_request_id
    }

    /// Swap the pending turn for its resolution, keeping the log length
    pub(super) fn resolve_pending(&mut self, resolution: Turn) {
        // Pending is always the last turn while awaiting
        match self.log.iter().rposition(Turn::is_pending) {
            Some(index) => self.log[index] = resolution,
            None => self.log.push(resolution),
        }
    }
}

// ============================================================================
// Session Context
// ============================================================================

/// Immutable configuration of one session
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    pub domain: Domain,
    pub greeting: String,
    /// Content of the pending turn
    pub placeholder: String,
}

impl SessionContext {
    pub fn new(
        session_id: impl Into<String>,
        domain: Domain,
        greeting: impl Into<String>,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            domain,
            greeting: greeting.into(),
            placeholder: placeholder.into(),
        }
    }

    /// Context built from the domain's profile with a new session id
    pub fn for_domain(domain: Domain) -> Self {
        let profile = domain.profile();
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            domain,
            profile.greeting,
            profile.placeholder,
        )
    }
}
