//! Mock implementations for testing
//!
//! These mocks let the session runtime run without a real backend.

use crate::gateway::{ChatMessage, Gateway, GatewayError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock Gateway
// ============================================================================

/// Mock gateway that returns queued replies
pub struct MockGateway {
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    name: String,
    /// Record of every history sent
    pub requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockGateway {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            name: name.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    /// Queue an error
    pub fn queue_error(&self, error: GatewayError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self, history: &[ChatMessage]) -> Result<String, GatewayError> {
        self.requests.lock().unwrap().push(history.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::network("No mock reply queued")))
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn chat(&self, history: &[ChatMessage]) -> Result<String, GatewayError> {
        self.next_reply(history)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Gated Mock Gateway (for in-flight testing)
// ============================================================================

/// Mock gateway whose calls block until the test releases them
pub struct GatedMockGateway {
    inner: MockGateway,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
    release: Arc<Notify>,
}

impl GatedMockGateway {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: MockGateway::new(name),
            request_started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }

    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.inner.queue_reply(reply);
    }

    pub fn queue_error(&self, error: GatewayError) {
        self.inner.queue_error(error);
    }

    /// Let one blocked call proceed
    pub fn release_one(&self) {
        self.release.notify_one();
    }

    pub fn recorded_requests(&self) -> Vec<Vec<ChatMessage>> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl Gateway for GatedMockGateway {
    async fn chat(&self, history: &[ChatMessage]) -> Result<String, GatewayError> {
        self.request_started.notify_one();
        self.release.notified().await;
        self.inner.next_reply(history)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use crate::gateway::GatewayErrorKind;
    use crate::runtime::{start_session, SessionError, SessionEvent, SessionHandle, SessionSnapshot};
    use crate::state_machine::transition::CANCELLED_NOTICE;
    use crate::state_machine::{SessionContext, TransitionError, Turn};
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn agri_context() -> SessionContext {
        SessionContext::for_domain(Domain::Agriculture)
    }

    fn greeting() -> Turn {
        Turn::system(Domain::Agriculture.profile().greeting)
    }

    /// Wait for the next broadcast update
    async fn next_update(rx: &mut tokio::sync::broadcast::Receiver<SessionEvent>) -> SessionSnapshot {
        loop {
            let event = tokio::time::timeout(TIMEOUT, rx.recv())
                .await
                .expect("timed out waiting for update")
                .expect("broadcast closed");
            if let SessionEvent::Update { snapshot } = event {
                return snapshot;
            }
        }
    }

    /// Wait until the session is idle again
    async fn wait_idle(handle: &SessionHandle, rx: &mut tokio::sync::broadcast::Receiver<SessionEvent>) -> SessionSnapshot {
        loop {
            let snapshot = next_update(rx).await;
            if !snapshot.awaiting_response {
                return snapshot;
            }
            assert_eq!(handle.snapshot().session_id, snapshot.session_id);
        }
    }

    #[tokio::test]
    async fn test_mock_gateway() {
        let mock = MockGateway::new("agri");
        mock.queue_reply("Hello");

        let reply = mock.chat(&[ChatMessage::user("hi")]).await.unwrap();
        assert_eq!(reply, "Hello");

        // Second call should fail (no more replies)
        let result = mock.chat(&[]).await;
        assert!(result.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    /// Successful round trip: greeting, question, answer
    #[tokio::test]
    async fn test_successful_exchange() {
        let gateway = Arc::new(GatedMockGateway::new("agri"));
        gateway.queue_reply("Plant at the onset of long rains.");

        let handle = start_session(agri_context(), Arc::clone(&gateway), TIMEOUT);
        let mut rx = handle.subscribe();
        assert_eq!(handle.snapshot().log, vec![greeting()]);

        let snapshot = handle.submit("When should I plant maize?").await.unwrap();
        assert_eq!(
            snapshot.log,
            vec![
                greeting(),
                Turn::user("When should I plant maize?"),
                Turn::pending("Thinking..."),
            ]
        );
        assert!(snapshot.awaiting_response);

        gateway.request_started.notified().await;
        gateway.release_one();

        let done = wait_idle(&handle, &mut rx).await;
        assert_eq!(
            done.log,
            vec![
                greeting(),
                Turn::user("When should I plant maize?"),
                Turn::system("Plant at the onset of long rains."),
            ]
        );
        assert_eq!(
            gateway.recorded_requests(),
            vec![vec![ChatMessage::user("When should I plant maize?")]]
        );
    }

    /// Failed round trip leaves an explicit error turn, never a stuck placeholder
    #[tokio::test]
    async fn test_failed_exchange() {
        let gateway = MockGateway::new("agri");
        gateway.queue_error(GatewayError::server_error("canister trapped"));

        let handle = start_session(agri_context(), gateway, TIMEOUT);
        let mut rx = handle.subscribe();

        handle.submit("When should I plant maize?").await.unwrap();
        let done = wait_idle(&handle, &mut rx).await;

        assert_eq!(done.log.len(), 3);
        assert_eq!(
            done.log[2],
            Turn::failed(GatewayErrorKind::Server.user_notice())
        );
        assert!(!done.awaiting_response);
    }

    #[tokio::test]
    async fn test_second_submit_rejected_while_in_flight() {
        let gateway = Arc::new(GatedMockGateway::new("agri"));
        gateway.queue_reply("first answer");

        let handle = start_session(agri_context(), Arc::clone(&gateway), TIMEOUT);
        let mut rx = handle.subscribe();

        handle.submit("first").await.unwrap();
        let err = handle.submit("second").await.unwrap_err();
        assert!(matches!(err, SessionError::Rejected(TransitionError::AwaitingResponse)));
        assert_eq!(handle.snapshot().log.len(), 3);

        // Draft stays editable meanwhile
        let snapshot = handle.update_draft("second, typed early").await.unwrap();
        assert_eq!(snapshot.draft, "second, typed early");
        assert!(snapshot.awaiting_response);

        gateway.request_started.notified().await;
        gateway.release_one();
        wait_idle(&handle, &mut rx).await;

        assert_eq!(gateway.recorded_requests().len(), 1);
        assert_eq!(handle.snapshot().draft, "second, typed early");
    }

    #[tokio::test]
    async fn test_blank_submit_rejected() {
        let handle = start_session(agri_context(), MockGateway::new("agri"), TIMEOUT);
        let err = handle.submit("   ").await.unwrap_err();
        assert!(matches!(err, SessionError::Rejected(TransitionError::EmptyMessage)));
        assert_eq!(handle.snapshot().log, vec![greeting()]);
    }

    #[tokio::test]
    async fn test_cancel_discards_late_reply() {
        let gateway = Arc::new(GatedMockGateway::new("agri"));
        gateway.queue_reply("late answer");

        let handle = start_session(agri_context(), Arc::clone(&gateway), TIMEOUT);
        handle.submit("question").await.unwrap();
        gateway.request_started.notified().await;

        let snapshot = handle.cancel().await.unwrap();
        assert!(!snapshot.awaiting_response);
        assert_eq!(snapshot.log[2], Turn::failed(CANCELLED_NOTICE));

        gateway.release_one();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handle.snapshot().log[2], Turn::failed(CANCELLED_NOTICE));
    }

    #[tokio::test]
    async fn test_timeout_becomes_failure() {
        let gateway = Arc::new(GatedMockGateway::new("agri"));

        // Never released, so the runtime deadline fires
        let handle = start_session(agri_context(), Arc::clone(&gateway), Duration::from_millis(50));
        let mut rx = handle.subscribe();

        handle.submit("anyone there?").await.unwrap();
        let done = wait_idle(&handle, &mut rx).await;
        assert_eq!(done.log[2], Turn::failed(GatewayErrorKind::Timeout.user_notice()));
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let gateway = Arc::new(MockGateway::new("agri"));
        gateway.queue_error(GatewayError::network("reset"));
        gateway.queue_reply("Second time lucky.");

        let handle = start_session(agri_context(), Arc::clone(&gateway), TIMEOUT);
        let mut rx = handle.subscribe();

        handle.submit("q").await.unwrap();
        wait_idle(&handle, &mut rx).await;

        handle.retry().await.unwrap();
        let done = wait_idle(&handle, &mut rx).await;
        assert_eq!(done.log.len(), 3);
        assert_eq!(done.log[2], Turn::system("Second time lucky."));

        let requests = gateway.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], requests[1]);
    }

    #[tokio::test]
    async fn test_follow_up_sends_full_history() {
        let gateway = Arc::new(MockGateway::new("agri"));
        gateway.queue_reply("a1");
        gateway.queue_reply("a2");

        let handle = start_session(agri_context(), Arc::clone(&gateway), TIMEOUT);
        let mut rx = handle.subscribe();

        handle.submit("q1").await.unwrap();
        wait_idle(&handle, &mut rx).await;
        handle.submit("q2").await.unwrap();
        wait_idle(&handle, &mut rx).await;

        assert_eq!(
            gateway.recorded_requests()[1],
            vec![
                ChatMessage::user("q1"),
                ChatMessage::system("a1"),
                ChatMessage::user("q2"),
            ]
        );
    }

    #[tokio::test]
    async fn test_runtime_stops_when_handles_dropped() {
        let handle = start_session(agri_context(), MockGateway::new("agri"), TIMEOUT);
        let mut rx = handle.subscribe();
        drop(handle);

        let closed = tokio::time::timeout(TIMEOUT, async {
            loop {
                if let Err(tokio::sync::broadcast::error::RecvError::Closed) = rx.recv().await {
                    return;
                }
            }
        })
        .await;
        assert!(closed.is_ok());
    }

    #[tokio::test]
    async fn test_handle_debug_names_session() {
        let context = agri_context();
        let session_id = context.session_id.clone();
        let handle = start_session(context, MockGateway::new("agri"), TIMEOUT);

        let printed = format!("{handle:?}");
        assert!(printed.starts_with("SessionHandle"));
        assert!(printed.contains(&session_id));
        assert!(printed.contains("Agriculture"));
    }
}
