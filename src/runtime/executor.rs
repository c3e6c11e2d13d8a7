//! Session runtime executor

use super::{Envelope, SessionEvent, SessionSnapshot};
use crate::gateway::{ChatMessage, Gateway, GatewayError};
use crate::state_machine::{transition, Effect, Event, SessionContext, SessionState, TransitionError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Runtime for one session, generic over the gateway so tests can inject a mock
pub struct SessionRuntime<G>
where
    G: Gateway + 'static,
{
    context: SessionContext,
    state: SessionState,
    gateway: Arc<G>,
    gateway_timeout: Duration,
    event_rx: mpsc::Receiver<Envelope>,
    /// Weak so that in-flight calls do not keep the session alive after unmount
    event_tx: mpsc::WeakSender<Envelope>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    /// Token to cancel the outstanding gateway call
    gateway_cancel_token: Option<CancellationToken>,
}

impl<G> SessionRuntime<G>
where
    G: Gateway + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        context: SessionContext,
        state: SessionState,
        gateway: G,
        gateway_timeout: Duration,
        event_rx: mpsc::Receiver<Envelope>,
        event_tx: mpsc::WeakSender<Envelope>,
        snapshot_tx: watch::Sender<SessionSnapshot>,
        broadcast_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            context,
            state,
            gateway: Arc::new(gateway),
            gateway_timeout,
            event_rx,
            event_tx,
            snapshot_tx,
            broadcast_tx,
            gateway_cancel_token: None,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(
            session_id = %self.context.session_id,
            domain = %self.context.domain,
            "Starting session runtime"
        );

        // Events are applied one at a time; the loop ends when every handle is gone
        while let Some(Envelope { event, ack }) = self.event_rx.recv().await {
            let from_gateway = event.is_gateway_completion();
            let outcome = self.process_event(event);

            if let Err(e) = &outcome {
                if from_gateway {
                    tracing::debug!(
                        session_id = %self.context.session_id,
                        error = %e,
                        "Discarding gateway completion"
                    );
                } else {
                    tracing::info!(
                        session_id = %self.context.session_id,
                        error = %e,
                        "Rejected session event"
                    );
                    let _ = self.broadcast_tx.send(SessionEvent::Error {
                        message: e.to_string(),
                    });
                }
            }

            if let Some(ack) = ack {
                let _ = ack.send(outcome.map(|()| self.snapshot()));
            }
        }

        if let Some(token) = self.gateway_cancel_token.take() {
            token.cancel();
        }

        tracing::info!(session_id = %self.context.session_id, "Session runtime stopped");
    }

    fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        // Pure state transition
        let result = transition(&self.state, &self.context, event)?;
        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }

        if !self.state.awaiting_response() {
            self.gateway_cancel_token = None;
        }

        // Draft edits are visible to snapshot readers but not broadcast
        self.snapshot_tx.send_replace(self.snapshot());
        Ok(())
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&self.context, &self.state)
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::CallGateway {
                request_id,
                history,
            } => self.spawn_gateway_call(request_id, history),

            Effect::AbortGateway => {
                if let Some(token) = self.gateway_cancel_token.take() {
                    tracing::info!(session_id = %self.context.session_id, "Aborting gateway call");
                    token.cancel();
                }
            }

            Effect::ReportFailure {
                request_id,
                message,
                kind,
            } => {
                tracing::warn!(
                    session_id = %self.context.session_id,
                    domain = %self.context.domain,
                    request_id,
                    kind = ?kind,
                    error = %message,
                    "Gateway call failed"
                );
            }

            Effect::NotifyClient => {
                let _ = self.broadcast_tx.send(SessionEvent::Update {
                    snapshot: self.snapshot(),
                });
            }
        }
    }

    /// Run the gateway call in the background; the outcome comes back as an event
    fn spawn_gateway_call(&mut self, request_id: u64, history: Vec<ChatMessage>) {
        let cancel_token = CancellationToken::new();
        self.gateway_cancel_token = Some(cancel_token.clone());

        let gateway = Arc::clone(&self.gateway);
        let event_tx = self.event_tx.clone();
        let timeout = self.gateway_timeout;
        let session_id = self.context.session_id.clone();

        tokio::spawn(async move {
            tracing::debug!(
                session_id = %session_id,
                request_id,
                turns = history.len(),
                "Making gateway request (background)"
            );

            let outcome = tokio::select! {
                () = cancel_token.cancelled() => {
                    tracing::debug!(session_id = %session_id, request_id, "Gateway request cancelled");
                    return;
                }
                res = tokio::time::timeout(timeout, gateway.chat(&history)) => res,
            };

            let event = match outcome {
                Ok(Ok(text)) => Event::GatewayReply { request_id, text },
                Ok(Err(GatewayError { kind, message })) => Event::GatewayFailed {
                    request_id,
                    message,
                    kind,
                },
                Err(_) => {
                    let err = GatewayError::timeout(format!(
                        "No reply within {}s",
                        timeout.as_secs()
                    ));
                    Event::GatewayFailed {
                        request_id,
                        message: err.message,
                        kind: err.kind,
                    }
                }
            };

            // The session may have been unmounted while we waited
            if let Some(tx) = event_tx.upgrade() {
                let _ = tx.send(Envelope { event, ack: None }).await;
            }
        });
    }
}
