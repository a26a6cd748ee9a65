// ABOUTME: HTTP surface for the SSE transport: stream bootstrap, POST ingress and session routing
// ABOUTME: Exposes the session registry, the dispatcher seam and the axum router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! HTTP server layer
//!
//! `GET <sse_path>` opens a stream and registers a session; `POST
//! <message_path>?session=<id>` routes the body to that session's transport.
//! Decoded messages go to a [`MessageDispatcher`] whose replies are pushed
//! back down the stream. Each session queues at most
//! `ServerConfig::inbox_capacity` messages; POSTs beyond that get a 429.

/// Application seam for decoded messages
pub mod dispatcher;
/// Bounded per-session message queue
pub mod inbox;
/// Live session lookup
pub mod registry;
/// Axum routes
pub mod routes;

pub use dispatcher::{EchoDispatcher, MessageDispatcher};
pub use inbox::SessionInbox;
pub use registry::{ChannelTransport, ConnectionMetadata, SessionHandle, SessionRegistry};
pub use routes::{SseRoutes, SseState};
