// ABOUTME: Server side of the MCP SSE transport: a session-correlated push stream plus POST ingress
// ABOUTME: Composes session, event writer, state machine and inbound decoding behind one facade
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # SSE Transport
//!
//! [`SseTransport`] owns one streaming HTTP response (the GET that opened the
//! stream) and pushes JSON-RPC messages down it as `message` events. Clients
//! talk back by POSTing to the URL advertised in the first `endpoint` event;
//! those bodies go through [`SseTransport::handle_message`].
//!
//! Handlers are registered through `&mut self`, before the transport is put
//! behind an `Arc` and the endpoint is exposed. Re-registering after traffic
//! starts is not supported.
//!
//! ```rust,no_run
//! use mcp_sse_transport::transport::{ChannelSink, SseTransport};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), mcp_sse_transport::transport::TransportError> {
//! let (sink, _body) = ChannelSink::channel(16);
//! let mut transport = SseTransport::new("/messages", sink)?;
//! transport.set_message_handler(|message| println!("got {:?}", message.method()));
//!
//! let transport = Arc::new(transport);
//! transport.start(CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

/// Transport error taxonomy
pub mod error;
/// Inbound payload decoding
pub mod inbound;
/// Injected logging interface
pub mod observer;
/// Session identifier
pub mod session;
/// Streaming response sinks
pub mod sink;
/// Lifecycle state machine
pub mod state;
/// SSE framing and event writer
pub mod writer;

pub use error::{TransportError, TransportResult};
pub use observer::{NoopLogger, TracingLogger, TransportLogger};
pub use session::Session;
pub use sink::{ChannelSink, EventStreamBody, ResponseSink};
pub use state::TransportState;

use crate::config::TransportConfig;
use crate::constants::sse;
use crate::jsonrpc::JsonRpcMessage;
use http::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONNECTION, CONTENT_TYPE,
};
use std::future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Callback receiving each decoded inbound message
pub type MessageHandler = Arc<dyn Fn(JsonRpcMessage) + Send + Sync>;
/// Callback receiving inbound decoding failures
pub type ErrorHandler = Arc<dyn Fn(&TransportError) + Send + Sync>;
/// Callback fired once when the transport closes
pub type CloseHandler = Arc<dyn Fn() + Send + Sync>;

/// Server-side SSE transport for one client session
pub struct SseTransport<S: ResponseSink> {
    endpoint: String,
    session: Session,
    /// Write lock: every frame goes through this guard
    sink: tokio::sync::Mutex<S>,
    state: Mutex<TransportState>,
    shutdown: CancellationToken,
    config: TransportConfig,
    logger: Arc<dyn TransportLogger>,
    on_close: Option<CloseHandler>,
    on_error: Option<ErrorHandler>,
    on_message: Option<MessageHandler>,
}

impl<S: ResponseSink + 'static> SseTransport<S> {
    /// Create a transport with default configuration and `tracing` logging
    ///
    /// # Errors
    ///
    /// Returns `StreamingUnsupported` if the sink cannot flush incrementally
    pub fn new(endpoint: impl Into<String>, sink: S) -> TransportResult<Self> {
        Self::with_config(
            endpoint,
            sink,
            TransportConfig::default(),
            Arc::new(TracingLogger),
        )
    }

    /// Create a transport with explicit configuration and logger
    ///
    /// # Errors
    ///
    /// Returns `StreamingUnsupported` if the sink cannot flush incrementally
    pub fn with_config(
        endpoint: impl Into<String>,
        sink: S,
        config: TransportConfig,
        logger: Arc<dyn TransportLogger>,
    ) -> TransportResult<Self> {
        if !sink.supports_flush() {
            return Err(TransportError::StreamingUnsupported);
        }
        Ok(Self {
            endpoint: endpoint.into(),
            session: Session::new(),
            sink: tokio::sync::Mutex::new(sink),
            state: Mutex::new(TransportState::Created),
            shutdown: CancellationToken::new(),
            config,
            logger,
            on_close: None,
            on_error: None,
            on_message: None,
        })
    }

    /// Session id advertised to the client
    #[must_use]
    pub fn session_id(&self) -> &str {
        self.session.id()
    }

    /// URL clients POST to: `<endpoint>?session=<id>`
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}?{}={}",
            self.endpoint,
            sse::SESSION_QUERY_PARAM,
            self.session.id()
        )
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> TransportState {
        *self.lock_state()
    }

    /// Whether the transport has been closed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state().is_closed()
    }

    /// Token cancelled when the transport closes
    ///
    /// The HTTP layer ends the response body when it fires.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Register the inbound message callback, replacing any previous one
    pub fn set_message_handler<F>(&mut self, handler: F)
    where
        F: Fn(JsonRpcMessage) + Send + Sync + 'static,
    {
        self.on_message = Some(Arc::new(handler));
    }

    /// Register the inbound error callback, replacing any previous one
    pub fn set_error_handler<F>(&mut self, handler: F)
    where
        F: Fn(&TransportError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
    }

    /// Register the close callback, replacing any previous one
    pub fn set_close_handler<F>(&mut self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_close = Some(Arc::new(handler));
    }

    /// Open the stream: write headers and the `endpoint` event, then watch `ctx`
    ///
    /// Cancelling `ctx` has the same effect as calling [`Self::close`].
    ///
    /// # Errors
    ///
    /// - `AlreadyStarted` if called twice (nothing is written)
    /// - `Closed` if the transport was closed before or during the call
    /// - `Write` if the client is already gone
    pub async fn start(self: &Arc<Self>, ctx: CancellationToken) -> TransportResult<()> {
        let mut sink = self.sink.lock().await;
        self.state().ensure_startable()?;

        sink.write_headers(Self::stream_headers())
            .map_err(TransportError::Write)?;

        let url = self.endpoint_url();
        match writer::write_event(&mut *sink, sse::ENDPOINT_EVENT, &url).await {
            Ok(bytes) => {
                self.logger
                    .event_written(self.session_id(), sse::ENDPOINT_EVENT, bytes);
            }
            Err(error) => {
                self.logger
                    .write_failed(self.session_id(), sse::ENDPOINT_EVENT, &error);
                return Err(error);
            }
        }

        // A close that raced the write wins
        self.lock_state().start()?;
        drop(sink);

        self.logger.started(self.session_id(), &url);
        self.spawn_watcher(ctx);
        Ok(())
    }

    /// Push a JSON-RPC message to the client as a `message` event
    ///
    /// Messages are delivered in call order.
    ///
    /// # Errors
    ///
    /// - `Closed` after `close`, `NotStarted` before `start`
    /// - `Serialization` if the message cannot be encoded
    /// - `Write` if the client is gone
    pub async fn send(&self, message: &JsonRpcMessage) -> TransportResult<()> {
        let mut sink = self.sink.lock().await;
        self.state().ensure_writable()?;
        let payload = serde_json::to_string(message).map_err(TransportError::Serialization)?;
        self.write_locked(&mut *sink, sse::MESSAGE_EVENT, &payload)
            .await
    }

    /// Push an already-encoded JSON payload as a `message` event
    ///
    /// # Errors
    ///
    /// Same as [`Self::send`], minus serialization
    pub async fn send_raw(&self, payload: &str) -> TransportResult<()> {
        let mut sink = self.sink.lock().await;
        self.state().ensure_writable()?;
        self.write_locked(&mut *sink, sse::MESSAGE_EVENT, payload)
            .await
    }

    /// Write a keep-alive comment
    ///
    /// # Errors
    ///
    /// Returns `Closed`/`NotStarted` outside the started state and `Write` on failure
    pub async fn send_keep_alive(&self) -> TransportResult<()> {
        let mut sink = self.sink.lock().await;
        self.state().ensure_writable()?;
        writer::write_comment(&mut *sink, sse::KEEP_ALIVE_COMMENT)
            .await
            .map(|_| ())
    }

    /// Decode a POST body and hand it to the message handler
    ///
    /// Independent of the stream's lifecycle: works before `start` and after
    /// `close`. Without a message handler, valid messages are dropped.
    ///
    /// # Errors
    ///
    /// Returns the decoding error after passing it to the error handler
    pub fn handle_message(&self, data: &[u8]) -> TransportResult<()> {
        match inbound::decode_message(data) {
            Ok(message) => {
                self.logger
                    .inbound_accepted(self.session_id(), message.method());
                if let Some(handler) = &self.on_message {
                    handler(message);
                }
                Ok(())
            }
            Err(error) => {
                self.logger.inbound_rejected(self.session_id(), &error);
                if let Some(handler) = &self.on_error {
                    handler(&error);
                }
                Err(error)
            }
        }
    }

    /// Close the transport
    ///
    /// The first call from a non-closed state stops the watcher, ends the
    /// stream and fires the close handler. Later calls are no-ops.
    ///
    /// # Errors
    ///
    /// Never fails; the `Result` keeps the signature uniform with the other operations
    pub fn close(&self) -> TransportResult<()> {
        self.close_once();
        Ok(())
    }

    /// Perform the close transition; `true` only for the call that did it
    fn close_once(&self) -> bool {
        if !self.lock_state().close() {
            return false;
        }
        self.shutdown.cancel();
        self.logger.closed(self.session_id());
        if let Some(handler) = &self.on_close {
            handler();
        }
        true
    }

    async fn write_locked(&self, sink: &mut S, event: &str, payload: &str) -> TransportResult<()> {
        match writer::write_event(sink, event, payload).await {
            Ok(bytes) => {
                self.logger.event_written(self.session_id(), event, bytes);
                Ok(())
            }
            Err(error) => {
                self.logger.write_failed(self.session_id(), event, &error);
                Err(error)
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, TransportState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stream_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(sse::CONTENT_TYPE_EVENT_STREAM),
        );
        headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_static(sse::CACHE_CONTROL_NO_CACHE),
        );
        headers.insert(
            CONNECTION,
            HeaderValue::from_static(sse::CONNECTION_KEEP_ALIVE),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(sse::ALLOW_ORIGIN_ANY),
        );
        headers
    }

    /// Background task tying the caller's context to `close`
    ///
    /// Holds only a weak reference, and exits as soon as the transport closes
    /// by any path, so it never outlives the transport.
    fn spawn_watcher(self: &Arc<Self>, ctx: CancellationToken) {
        let transport = Arc::downgrade(self);
        let shutdown = self.shutdown.clone();
        let mut keep_alive = self.config.keep_alive_interval.map(keep_alive_ticker);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = shutdown.cancelled() => break,
                    () = ctx.cancelled() => {
                        if let Some(transport) = transport.upgrade() {
                            transport.close_once();
                        }
                        break;
                    }
                    () = next_tick(keep_alive.as_mut()) => {
                        if !Self::keep_alive(&transport).await {
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Returns `false` once the watcher should stop
    async fn keep_alive(transport: &Weak<Self>) -> bool {
        let Some(transport) = transport.upgrade() else {
            return false;
        };
        match transport.send_keep_alive().await {
            Ok(()) => true,
            Err(TransportError::Closed) => false,
            Err(error) => {
                transport
                    .logger
                    .write_failed(transport.session_id(), "keepalive", &error);
                transport.close_once();
                false
            }
        }
    }
}

/// Dropping cancels the shutdown token, which ends the stream and the watcher.
///
/// This is not a `close()`: the state is left as it was and the close handler
/// does not run. Owners that rely on the close handler (for example to
/// unregister the session) must call `close()` before letting go.
impl<S: ResponseSink> Drop for SseTransport<S> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn keep_alive_ticker(period: Duration) -> Interval {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn next_tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => future::pending::<()>().await,
    }
}
