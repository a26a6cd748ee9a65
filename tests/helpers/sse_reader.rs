// ABOUTME: Reads Server-Sent Events from a streaming Axum response body in tests
// ABOUTME: Wraps eventsource-stream so tests can await one parsed event at a time

use axum::body::{Body, BodyDataStream};
use eventsource_stream::{Event, EventStream, Eventsource};
use futures_util::StreamExt;
use std::pin::Pin;
use std::time::Duration;

/// Incremental SSE parser over a response body
pub struct SseReader {
    events: Pin<Box<EventStream<BodyDataStream>>>,
}

impl SseReader {
    /// Start reading `body` as an event stream
    pub fn new(body: Body) -> Self {
        Self {
            events: Box::pin(body.into_data_stream().eventsource()),
        }
    }

    /// Next event, or `None` once the stream has ended
    ///
    /// Panics if nothing arrives within five seconds.
    pub async fn next_event(&mut self) -> Option<Event> {
        let next = tokio::time::timeout(Duration::from_secs(5), self.events.next())
            .await
            .expect("timed out waiting for an SSE event")?;
        Some(next.expect("malformed SSE stream"))
    }

    /// Whether anything arrives within `wait`
    #[allow(dead_code)]
    pub async fn is_idle_for(&mut self, wait: Duration) -> bool {
        tokio::time::timeout(wait, self.events.next()).await.is_err()
    }
}
