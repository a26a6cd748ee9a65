// ABOUTME: Bounded per-session queue between the POST path and the session's dispatcher task
// ABOUTME: Refuses new messages with a rate-limit error while the queue is full
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::registry::ChannelTransport;
use crate::errors::{AppError, AppResult};
use crate::jsonrpc::JsonRpcMessage;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Decoded messages waiting for a session's dispatcher
pub struct SessionInbox {
    sender: mpsc::Sender<JsonRpcMessage>,
    capacity: usize,
    // Serializes the capacity check with the enqueue so concurrent POSTs cannot overshoot
    admission: Mutex<()>,
}

impl SessionInbox {
    /// Create an inbox holding at most `capacity` messages
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero (rejected earlier by `ServerConfig::validate`).
    #[must_use]
    pub fn channel(capacity: usize) -> (Arc<Self>, mpsc::Receiver<JsonRpcMessage>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let inbox = Arc::new(Self {
            sender,
            capacity,
            admission: Mutex::new(()),
        });
        (inbox, receiver)
    }

    /// Decode `body` through the transport and queue the result
    ///
    /// # Errors
    ///
    /// Returns a rate-limit error without decoding when the inbox is full,
    /// otherwise whatever `handle_message` reports.
    pub fn admit(&self, transport: &ChannelTransport, body: &[u8]) -> AppResult<()> {
        let _admission = self
            .admission
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.sender.capacity() == 0 {
            warn!(
                session_id = %transport.session_id(),
                capacity = self.capacity,
                "Session inbox full, refusing message"
            );
            return Err(AppError::rate_limited(self.capacity));
        }
        transport.handle_message(body)?;
        Ok(())
    }

    /// Queue a decoded message (called from the transport's message handler)
    pub fn push(&self, message: JsonRpcMessage) {
        match self.sender.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(capacity = self.capacity, "Session inbox full, dropping message");
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Dispatcher gone, dropping inbound message");
            }
        }
    }

    /// Free slots left
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.sender.capacity()
    }

    /// Maximum number of queued messages
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
