//! Server-Sent Events support

use crate::runtime::{SessionEvent, SessionSnapshot};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Current snapshot first, then every broadcast session event
pub fn sse_stream(
    init: SessionSnapshot,
    broadcast_rx: tokio::sync::broadcast::Receiver<SessionEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move {
        Ok(Event::default()
            .event("init")
            .data(json!({ "type": "init", "session": init }).to_string()))
    });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(session_event_to_axum(event))),
        Err(_) => None, // Skip lagged messages
    });

    Sse::new(init.chain(broadcasts)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn session_event_to_axum(event: SessionEvent) -> Event {
    let (event_type, data) = match event {
        SessionEvent::Update { snapshot } => (
            "update",
            json!({
                "type": "update",
                "session": snapshot
            }),
        ),
        SessionEvent::Error { message } => (
            "error",
            json!({
                "type": "error",
                "message": message
            }),
        ),
    };

    Event::default().event(event_type).data(data.to_string())
}
