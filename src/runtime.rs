//! Runtime for executing advisory sessions
//!
//! Each mounted session runs as one task that owns its [`SessionState`],
//! applies events one at a time and executes the resulting effects. Other
//! parts of the process talk to it through a [`SessionHandle`].

mod executor;

#[cfg(test)]
pub mod testing;

use executor::SessionRuntime;

use crate::domain::Domain;
use crate::gateway::Gateway;
use crate::state_machine::{Event, SessionContext, SessionState, Turn, TransitionError};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// What connected clients render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub domain: Domain,
    pub log: Vec<Turn>,
    pub draft: String,
    pub awaiting_response: bool,
}

impl SessionSnapshot {
    pub fn capture(context: &SessionContext, state: &SessionState) -> Self {
        Self {
            session_id: context.session_id.clone(),
            domain: context.domain,
            log: state.log().to_vec(),
            draft: state.draft().to_string(),
            awaiting_response: state.awaiting_response(),
        }
    }
}

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Update { snapshot: SessionSnapshot },
    Error { message: String },
}

/// An event plus, for user-originated events, where to report the outcome
#[derive(Debug)]
pub struct Envelope {
    pub event: Event,
    pub ack: Option<oneshot::Sender<Result<SessionSnapshot, TransitionError>>>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("Session has been closed")]
    Closed,
}

/// Handle to interact with a running session
///
/// The runtime stops once every handle has been dropped.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: String,
    domain: Domain,
    event_tx: mpsc::Sender<Envelope>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session_id", &self.session_id)
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

impl SessionHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Latest state, including draft edits
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Send an event and wait until the runtime has applied or rejected it
    pub async fn dispatch(&self, event: Event) -> Result<SessionSnapshot, SessionError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.event_tx
            .send(Envelope {
                event,
                ack: Some(ack_tx),
            })
            .await
            .map_err(|_| SessionError::Closed)?;
        let outcome = ack_rx.await.map_err(|_| SessionError::Closed)?;
        Ok(outcome?)
    }

    pub async fn submit(&self, text: impl Into<String>) -> Result<SessionSnapshot, SessionError> {
        self.dispatch(Event::submit(text)).await
    }

    pub async fn update_draft(
        &self,
        text: impl Into<String>,
    ) -> Result<SessionSnapshot, SessionError> {
        self.dispatch(Event::update_draft(text)).await
    }

    pub async fn cancel(&self) -> Result<SessionSnapshot, SessionError> {
        self.dispatch(Event::Cancel).await
    }

    pub async fn retry(&self) -> Result<SessionSnapshot, SessionError> {
        self.dispatch(Event::Retry).await
    }
}

/// Construct a fresh session and start its runtime on the current tokio runtime
pub fn start_session<G>(context: SessionContext, gateway: G, gateway_timeout: Duration) -> SessionHandle
where
    G: Gateway + 'static,
{
    let state = SessionState::new(&context);
    let snapshot = SessionSnapshot::capture(&context, &state);

    let (event_tx, event_rx) = mpsc::channel(32);
    let (snapshot_tx, snapshot_rx) = watch::channel(snapshot);
    let (broadcast_tx, _) = broadcast::channel(128);

    let handle = SessionHandle {
        session_id: context.session_id.clone(),
        domain: context.domain,
        event_tx: event_tx.clone(),
        snapshot_rx,
        broadcast_tx: broadcast_tx.clone(),
    };

    let runtime = SessionRuntime::new(
        context,
        state,
        gateway,
        gateway_timeout,
        event_rx,
        event_tx.downgrade(),
        snapshot_tx,
        broadcast_tx,
    );

    let session_id = handle.session_id.clone();
    tokio::spawn(async move {
        runtime.run().await;
        tracing::info!(session_id = %session_id, "Session runtime finished");
    });

    handle
}
