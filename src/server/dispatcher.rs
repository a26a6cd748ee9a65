// ABOUTME: Application seam receiving decoded inbound messages and producing replies
// ABOUTME: Includes a minimal dispatcher that answers ping and rejects unknown methods
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::jsonrpc::{error_codes, JsonRpcMessage, JsonRpcResponse};
use async_trait::async_trait;
use serde_json::json;

/// Handles decoded messages for a session
///
/// Whatever is returned is sent back down the session's SSE stream.
#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    /// Handle one inbound message
    async fn dispatch(&self, session_id: &str, message: JsonRpcMessage) -> Option<JsonRpcMessage>;
}

/// Dispatcher that answers `ping` and nothing else
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoDispatcher;

#[async_trait]
impl MessageDispatcher for EchoDispatcher {
    async fn dispatch(&self, _session_id: &str, message: JsonRpcMessage) -> Option<JsonRpcMessage> {
        let JsonRpcMessage::Request(request) = message else {
            return None;
        };
        // Notifications never get a reply
        let id = request.id?;

        let response = if request.method == "ping" {
            JsonRpcResponse::success(Some(id), json!({}))
        } else {
            JsonRpcResponse::error(
                Some(id),
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            )
        };
        Some(response.into())
    }
}
