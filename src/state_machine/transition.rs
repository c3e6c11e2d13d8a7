//! Pure state transition function
//!
//! Given the same state, context and event this always produces the same
//! new state and effects. No I/O happens here.

use super::{Effect, Event, SessionContext, SessionPhase, SessionState, Turn};
use thiserror::Error;

/// Text of the failed turn left behind by a user cancellation
pub const CANCELLED_NOTICE: &str = "Request cancelled.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons an event is rejected; the state is left untouched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Still waiting for the previous reply")]
    AwaitingResponse,
    #[error("No request is in flight")]
    NotAwaiting,
    #[error("Nothing to retry")]
    NothingToRetry,
    #[error("Reply for request {0} is no longer awaited")]
    StaleResponse(u64),
}

/// Pure transition function
pub fn transition(
    state: &SessionState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state.phase, event) {
        // ============================================================
        // Draft
        // ============================================================

        // Allowed in any phase so the input stays editable while awaiting
        (_, Event::UpdateDraft { text }) => {
            let mut next = state.clone();
            next.draft = text;
            Ok(TransitionResult::new(next))
        }

        // ============================================================
        // Submission
        // ============================================================
        (_, Event::Submit { text }) if text.trim().is_empty() => Err(TransitionError::EmptyMessage),

        (SessionPhase::AwaitingResponse { .. }, Event::Submit { .. }) => {
            Err(TransitionError::AwaitingResponse)
        }

        // Idle + Submit -> AwaitingResponse
        (SessionPhase::Idle, Event::Submit { text }) => {
            let mut next = state.clone();
            let request_id = next.next_request_id();
            next.log.push(Turn::user(text));
            next.log.push(Turn::pending(context.placeholder.clone()));
            next.draft.clear();
            next.phase = SessionPhase::AwaitingResponse { request_id };
            let history = next.history();

            Ok(TransitionResult::new(next)
                .with_effect(Effect::call_gateway(request_id, history))
                .with_effect(Effect::NotifyClient))
        }

        // ============================================================
        // Reconciliation
        // ============================================================

        // AwaitingResponse + GatewayReply -> Idle, pending becomes the reply
        (SessionPhase::AwaitingResponse { request_id }, Event::GatewayReply { request_id: got, text })
            if request_id == got =>
        {
            let mut next = state.clone();
            next.resolve_pending(Turn::system(text));
            next.phase = SessionPhase::Idle;
            Ok(TransitionResult::new(next).with_effect(Effect::NotifyClient))
        }

        // AwaitingResponse + GatewayFailed -> Idle, pending becomes a failure notice
        (
            SessionPhase::AwaitingResponse { request_id },
            Event::GatewayFailed {
                request_id: got,
                message,
                kind,
            },
        ) if request_id == got => {
            let mut next = state.clone();
            next.resolve_pending(Turn::failed(kind.user_notice()));
            next.phase = SessionPhase::Idle;
            Ok(TransitionResult::new(next)
                .with_effect(Effect::ReportFailure {
                    request_id,
                    message,
                    kind,
                })
                .with_effect(Effect::NotifyClient))
        }

        // Completion for a request that was cancelled or superseded
        (_, Event::GatewayReply { request_id, .. } | Event::GatewayFailed { request_id, .. }) => {
            Err(TransitionError::StaleResponse(request_id))
        }

        // ============================================================
        // Cancellation
        // ============================================================
        (SessionPhase::AwaitingResponse { .. }, Event::Cancel) => {
            let mut next = state.clone();
            next.resolve_pending(Turn::failed(CANCELLED_NOTICE));
            next.phase = SessionPhase::Idle;
            Ok(TransitionResult::new(next)
                .with_effect(Effect::AbortGateway)
                .with_effect(Effect::NotifyClient))
        }

        (SessionPhase::Idle, Event::Cancel) => Err(TransitionError::NotAwaiting),

        // ============================================================
        // Retry
        // ============================================================

        // Idle with a trailing failure -> resend the same history
        (SessionPhase::Idle, Event::Retry) if state.log.last().is_some_and(Turn::is_failed) => {
            let mut next = state.clone();
            let request_id = next.next_request_id();
            if let Some(last) = next.log.last_mut() {
                *last = Turn::pending(context.placeholder.clone());
            }
            next.phase = SessionPhase::AwaitingResponse { request_id };
            let history = next.history();

            Ok(TransitionResult::new(next)
                .with_effect(Effect::call_gateway(request_id, history))
                .with_effect(Effect::NotifyClient))
        }

        (SessionPhase::AwaitingResponse { .. }, Event::Retry) => {
            Err(TransitionError::AwaitingResponse)
        }

        (SessionPhase::Idle, Event::Retry) => Err(TransitionError::NothingToRetry),
    }
}
