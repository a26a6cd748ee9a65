// ABOUTME: Injected logging interface for the SSE transport
// ABOUTME: Default implementation emits structured tracing events; a no-op variant keeps tests silent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::error::TransportError;
use tracing::{debug, info, warn};

/// Observability hooks a transport reports through
///
/// Passed at construction so each transport can be observed (or silenced)
/// independently. Every method defaults to doing nothing.
pub trait TransportLogger: Send + Sync {
    /// Stream established and endpoint advertised
    fn started(&self, _session_id: &str, _endpoint_url: &str) {}

    /// Transport closed
    fn closed(&self, _session_id: &str) {}

    /// A frame was written and flushed
    fn event_written(&self, _session_id: &str, _event: &str, _bytes: usize) {}

    /// Writing a frame failed
    fn write_failed(&self, _session_id: &str, _event: &str, _error: &TransportError) {}

    /// An inbound message was decoded
    fn inbound_accepted(&self, _session_id: &str, _method: Option<&str>) {}

    /// An inbound payload was rejected
    fn inbound_rejected(&self, _session_id: &str, _error: &TransportError) {}
}

/// Logger that forwards to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TransportLogger for TracingLogger {
    fn started(&self, session_id: &str, endpoint_url: &str) {
        info!(
            session_id = %session_id,
            endpoint = %endpoint_url,
            event_type = "sse_started",
            "SSE transport started"
        );
    }

    fn closed(&self, session_id: &str) {
        info!(
            session_id = %session_id,
            event_type = "sse_closed",
            "SSE transport closed"
        );
    }

    fn event_written(&self, session_id: &str, event: &str, bytes: usize) {
        debug!(
            session_id = %session_id,
            sse.event = %event,
            sse.bytes = bytes,
            "SSE event written"
        );
    }

    fn write_failed(&self, session_id: &str, event: &str, error: &TransportError) {
        warn!(
            session_id = %session_id,
            sse.event = %event,
            error = %error,
            "SSE write failed"
        );
    }

    fn inbound_accepted(&self, session_id: &str, method: Option<&str>) {
        debug!(
            session_id = %session_id,
            mcp.method = method.unwrap_or("<response>"),
            "Inbound message accepted"
        );
    }

    fn inbound_rejected(&self, session_id: &str, error: &TransportError) {
        warn!(
            session_id = %session_id,
            error = %error,
            "Inbound message rejected"
        );
    }
}

/// Logger that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl TransportLogger for NoopLogger {}
