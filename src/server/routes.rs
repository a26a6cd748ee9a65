// ABOUTME: Axum routes opening SSE streams and accepting session-correlated POSTed messages
// ABOUTME: Wires each new stream to a transport, the session registry and the dispatcher
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::dispatcher::MessageDispatcher;
use super::inbox::SessionInbox;
use super::registry::{ChannelTransport, SessionRegistry};
use crate::config::ServerConfig;
use crate::constants::{http as http_constants, sse};
use crate::errors::{AppError, AppResult};
use crate::jsonrpc::JsonRpcMessage;
use crate::transport::{ChannelSink, SseTransport, TracingLogger, TransportError};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Shared state for the SSE routes
#[derive(Clone)]
pub struct SseState {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Live sessions
    pub registry: SessionRegistry,
    /// Application handling decoded messages
    pub dispatcher: Arc<dyn MessageDispatcher>,
}

impl SseState {
    /// Bundle configuration, registry and dispatcher
    #[must_use]
    pub fn new(
        config: ServerConfig,
        registry: SessionRegistry,
        dispatcher: Arc<dyn MessageDispatcher>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            registry,
            dispatcher,
        }
    }
}

/// SSE routes
pub struct SseRoutes;

impl SseRoutes {
    /// Create the SSE stream and message ingress routes
    pub fn routes(state: SseState) -> Router {
        let body_limit = state.config.max_message_size;
        Router::new()
            .route(&state.config.sse_path, get(Self::handle_sse_stream))
            .route(
                &state.config.message_path,
                post(Self::handle_post_message).layer(DefaultBodyLimit::max(body_limit)),
            )
            .with_state(state)
    }

    /// Open a new session and stream its events
    async fn handle_sse_stream(State(state): State<SseState>) -> AppResult<Response> {
        let (sink, body) = ChannelSink::channel(state.config.transport.channel_capacity);
        let mut transport = SseTransport::with_config(
            state.config.message_path.clone(),
            sink,
            state.config.transport.clone(),
            Arc::new(TracingLogger),
        )?;
        let session_id = transport.session_id().to_owned();

        // Handlers run on the POST path; dispatch happens on a separate task
        let (inbox, inbox_rx) = SessionInbox::channel(state.config.inbox_capacity);
        let handler_inbox = Arc::clone(&inbox);
        transport.set_message_handler(move |message| handler_inbox.push(message));
        let error_session = session_id.clone();
        transport.set_error_handler(move |error| {
            debug!(session_id = %error_session, error = %error, "Rejected inbound message");
        });
        transport.set_close_handler(state.registry.remover(session_id.clone()));

        let transport = Arc::new(transport);
        state.registry.register(Arc::clone(&transport), inbox);

        // Dropped with the response body when the client disconnects
        let ctx = CancellationToken::new();
        if let Err(error) = transport.start(ctx.clone()).await {
            transport.close()?;
            return Err(error.into());
        }

        tokio::spawn(pump_replies(
            Arc::downgrade(&transport),
            inbox_rx,
            Arc::clone(&state.dispatcher),
            session_id.clone(),
        ));

        info!(session_id = %session_id, "SSE stream opened");
        Ok(body
            .into_response(transport.shutdown_token(), ctx.drop_guard())
            .await)
    }

    /// Accept one JSON-RPC message for an existing session
    async fn handle_post_message(
        State(state): State<SseState>,
        Query(params): Query<HashMap<String, String>>,
        headers: HeaderMap,
        body: Result<Bytes, BytesRejection>,
    ) -> AppResult<StatusCode> {
        let session_id = params
            .get(sse::SESSION_QUERY_PARAM)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::missing_field(sse::SESSION_QUERY_PARAM))?;

        if !is_json_content_type(&headers) {
            let received = headers
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("none");
            return Err(AppError::unsupported_media_type(format!(
                "{received} (expected {})",
                http_constants::CONTENT_TYPE_JSON
            )));
        }

        let session = state
            .registry
            .get(session_id)
            .ok_or_else(|| AppError::not_found(format!("Session {session_id}")))?;

        let body = body.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::payload_too_large(state.config.max_message_size)
            } else {
                AppError::invalid_input(rejection.body_text())
            }
        })?;

        session.inbox.admit(&session.transport, &body)?;
        state.registry.touch(session_id);
        Ok(StatusCode::ACCEPTED)
    }
}

/// Whether the request declares a JSON body (parameters such as charset are ignored)
fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|media_type| {
            media_type
                .trim()
                .eq_ignore_ascii_case(http_constants::CONTENT_TYPE_JSON)
        })
}

/// Feed inbound messages to the dispatcher and push replies down the stream
///
/// Ends once the transport and its registry entry are gone (they own the inbox).
async fn pump_replies(
    transport: Weak<ChannelTransport>,
    mut inbox: mpsc::Receiver<JsonRpcMessage>,
    dispatcher: Arc<dyn MessageDispatcher>,
    session_id: String,
) {
    while let Some(message) = inbox.recv().await {
        let Some(reply) = dispatcher.dispatch(&session_id, message).await else {
            continue;
        };
        let Some(transport) = transport.upgrade() else {
            break;
        };
        match transport.send(&reply).await {
            Ok(()) => {}
            Err(TransportError::Closed) => break,
            Err(error) => {
                warn!(session_id = %session_id, error = %error, "Failed to deliver reply");
            }
        }
    }
    debug!(session_id = %session_id, "Reply pump finished");
}
