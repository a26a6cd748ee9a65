// ABOUTME: Response sink capability used by the SSE transport (headers, write, flush)
// ABOUTME: Provides the channel-backed sink whose paired body streams events to an Axum response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Streaming response destinations.
//!
//! The transport never talks to a socket directly. It writes to a
//! [`ResponseSink`], which must be able to flush incrementally; sinks that
//! can only deliver a body at the end of the request are refused at
//! construction time.
//!
//! [`ChannelSink`] is the production sink: writes accumulate in a buffer and
//! every flush pushes one chunk through a bounded channel into the paired
//! [`EventStreamBody`], which the HTTP layer turns into the response.

use async_trait::async_trait;
use axum::body::Body;
use axum::response::{IntoResponse, Response};
use bytes::{Bytes, BytesMut};
use http::{HeaderMap, StatusCode};
use std::convert::Infallible;
use std::io;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::{CancellationToken, DropGuard};

/// Streaming HTTP response destination
#[async_trait]
pub trait ResponseSink: Send {
    /// Whether the sink can push bytes to the client before the response ends
    fn supports_flush(&self) -> bool;

    /// Set response headers; must be called once, before the first write
    ///
    /// # Errors
    ///
    /// Returns an error if headers were already sent or the client is gone
    fn write_headers(&mut self, headers: HeaderMap) -> io::Result<()>;

    /// Write bytes, returning how many were accepted
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is gone
    async fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Push everything written so far to the client
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is gone
    async fn flush(&mut self) -> io::Result<()>;
}

/// Sink that forwards flushed chunks to an [`EventStreamBody`]
pub struct ChannelSink {
    headers: Option<oneshot::Sender<HeaderMap>>,
    pending: BytesMut,
    chunks: mpsc::Sender<Bytes>,
}

impl ChannelSink {
    /// Create a sink and the body that drains it
    ///
    /// `capacity` bounds the number of flushed chunks waiting for the client;
    /// a full channel makes `flush` wait, which throttles a slow reader.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, EventStreamBody) {
        let (header_tx, header_rx) = oneshot::channel();
        let (chunk_tx, chunk_rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                headers: Some(header_tx),
                pending: BytesMut::new(),
                chunks: chunk_tx,
            },
            EventStreamBody {
                headers: header_rx,
                chunks: chunk_rx,
            },
        )
    }
}

#[async_trait]
impl ResponseSink for ChannelSink {
    fn supports_flush(&self) -> bool {
        true
    }

    fn write_headers(&mut self, headers: HeaderMap) -> io::Result<()> {
        let sender = self.headers.take().ok_or_else(|| {
            io::Error::new(io::ErrorKind::AlreadyExists, "response headers already sent")
        })?;
        sender
            .send(headers)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "response body dropped"))
    }

    async fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.chunks.is_closed() {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "client disconnected",
            ));
        }
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    async fn flush(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let chunk = self.pending.split().freeze();
        self.chunks
            .send(chunk)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "client disconnected"))
    }
}

/// Receiving half of a [`ChannelSink`]
pub struct EventStreamBody {
    headers: oneshot::Receiver<HeaderMap>,
    chunks: mpsc::Receiver<Bytes>,
}

impl EventStreamBody {
    /// Build the streaming HTTP response
    ///
    /// Call after the transport has been started so headers are available.
    /// The body ends once `shutdown` fires and buffered chunks are drained.
    /// Dropping the body (client disconnect) drops `disconnect`, which
    /// cancels whatever token it guards.
    pub async fn into_response(self, shutdown: CancellationToken, disconnect: DropGuard) -> Response {
        let Ok(headers) = self.headers.await else {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "event stream was never started",
            )
                .into_response();
        };

        let mut chunks = self.chunks;
        let stream = async_stream::stream! {
            let _disconnect = disconnect;
            loop {
                let next = tokio::select! {
                    biased;
                    chunk = chunks.recv() => chunk,
                    () = shutdown.cancelled() => None,
                };
                match next {
                    Some(chunk) => yield Ok::<Bytes, Infallible>(chunk),
                    None => break,
                }
            }
        };

        let mut response = Response::new(Body::from_stream(stream));
        *response.headers_mut() = headers;
        response
    }
}
