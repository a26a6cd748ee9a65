// ABOUTME: Session registry mapping advertised session ids to their live SSE transports
// ABOUTME: Tracks connection metadata and removes sessions when their transport closes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::inbox::SessionInbox;
use crate::transport::{ChannelSink, SseTransport};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::{Arc, Weak};
use tracing::{info, warn};

/// Transport type served by the HTTP layer
pub type ChannelTransport = SseTransport<ChannelSink>;

/// SSE connection metadata
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionMetadata {
    /// Session id advertised in the endpoint event
    pub session_id: String,
    /// When the stream was opened
    pub created_at: DateTime<Utc>,
    /// Last accepted POST for this session
    pub last_activity: DateTime<Utc>,
}

/// A live session's transport and inbound queue
#[derive(Clone)]
pub struct SessionHandle {
    /// Transport writing the session's stream
    pub transport: Arc<ChannelTransport>,
    /// Messages waiting for the dispatcher
    pub inbox: Arc<SessionInbox>,
}

struct SessionEntry {
    handle: SessionHandle,
    metadata: ConnectionMetadata,
}

type SessionMap = DashMap<String, SessionEntry>;

/// Live sessions keyed by session id
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<SessionMap>,
}

impl SessionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transport and its inbox under the session id
    pub fn register(&self, transport: Arc<ChannelTransport>, inbox: Arc<SessionInbox>) {
        let now = Utc::now();
        let session_id = transport.session_id().to_owned();
        let metadata = ConnectionMetadata {
            session_id: session_id.clone(),
            created_at: now,
            last_activity: now,
        };
        self.sessions.insert(
            session_id.clone(),
            SessionEntry {
                handle: SessionHandle { transport, inbox },
                metadata,
            },
        );
        info!(session_id = %session_id, "Registered SSE session");
    }

    /// Look up a live session
    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.handle.clone())
    }

    /// Record activity on a session
    pub fn touch(&self, session_id: &str) {
        if let Some(mut entry) = self.sessions.get_mut(session_id) {
            entry.metadata.last_activity = Utc::now();
        }
    }

    /// Remove a session, returning its transport
    pub fn remove(&self, session_id: &str) -> Option<Arc<ChannelTransport>> {
        Self::remove_from(&self.sessions, session_id)
    }

    /// Close handler that unregisters `session_id` without keeping the registry alive
    #[must_use]
    pub fn remover(&self, session_id: String) -> impl Fn() + Send + Sync + 'static {
        let sessions: Weak<SessionMap> = Arc::downgrade(&self.sessions);
        move || {
            if let Some(sessions) = sessions.upgrade() {
                Self::remove_from(&sessions, &session_id);
            }
        }
    }

    fn remove_from(sessions: &SessionMap, session_id: &str) -> Option<Arc<ChannelTransport>> {
        let removed = sessions
            .remove(session_id)
            .map(|(_, entry)| entry.handle.transport);
        if removed.is_some() {
            info!(session_id = %session_id, "Unregistered SSE session");
        }
        removed
    }

    /// Metadata for one session
    #[must_use]
    pub fn metadata(&self, session_id: &str) -> Option<ConnectionMetadata> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.metadata.clone())
    }

    /// Number of live sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is live
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Close every live transport (used on server shutdown)
    pub fn close_all(&self) {
        // Collect first: close handlers remove entries from the map
        let transports: Vec<Arc<ChannelTransport>> = self
            .sessions
            .iter()
            .map(|entry| Arc::clone(&entry.handle.transport))
            .collect();
        for transport in transports {
            if let Err(error) = transport.close() {
                warn!(
                    session_id = %transport.session_id(),
                    error = %error,
                    "Failed to close session"
                );
            }
        }
    }
}
