// ABOUTME: Error taxonomy for the SSE transport covering construction, protocol and decoding failures
// ABOUTME: Maps transport failures onto the crate-wide ErrorCode for the HTTP boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AppError, ErrorCode};
use thiserror::Error;

/// Failures raised by [`SseTransport`](super::SseTransport) and its parts
#[derive(Debug, Error)]
pub enum TransportError {
    /// The response sink cannot flush incrementally, so it cannot carry a stream
    #[error("response sink does not support streaming flush")]
    StreamingUnsupported,

    /// `start` was called on a transport that is already streaming
    #[error("transport already started")]
    AlreadyStarted,

    /// A write was attempted before `start` emitted the endpoint event
    #[error("transport not started")]
    NotStarted,

    /// The transport has been closed
    #[error("transport closed")]
    Closed,

    /// Inbound payload was empty
    #[error("empty message")]
    EmptyMessage,

    /// Inbound payload is not well-formed JSON or does not fit the message model
    #[error("invalid message: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Inbound payload is JSON but not a JSON-RPC 2.0 envelope
    #[error("invalid message: {0}")]
    InvalidEnvelope(String),

    /// Event name is empty or would break SSE framing
    #[error("invalid event name: {0:?}")]
    InvalidEventName(String),

    /// Outbound message could not be encoded
    #[error("failed to serialize message: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The underlying connection rejected a write or flush
    #[error("failed to write to event stream: {0}")]
    Write(#[source] std::io::Error),
}

impl TransportError {
    /// Whether the error came from decoding an inbound payload
    #[must_use]
    pub const fn is_decoding(&self) -> bool {
        matches!(
            self,
            Self::EmptyMessage | Self::InvalidJson(_) | Self::InvalidEnvelope(_)
        )
    }

    /// Crate-wide error code for this failure
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyMessage => ErrorCode::InvalidInput,
            Self::InvalidJson(_) | Self::InvalidEnvelope(_) => ErrorCode::InvalidFormat,
            Self::AlreadyStarted | Self::NotStarted => ErrorCode::ResourceConflict,
            Self::Closed => ErrorCode::ResourceUnavailable,
            Self::StreamingUnsupported | Self::InvalidEventName(_) => ErrorCode::InternalError,
            Self::Serialization(_) => ErrorCode::SerializationError,
            Self::Write(_) => ErrorCode::StreamError,
        }
    }
}

impl From<TransportError> for AppError {
    fn from(error: TransportError) -> Self {
        Self::new(error.error_code(), error.to_string()).with_source(error)
    }
}

/// Result alias for transport operations
pub type TransportResult<T> = Result<T, TransportError>;
