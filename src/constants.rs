// ABOUTME: Protocol constants for the SSE transport and its HTTP layer
// ABOUTME: Defines event names, header values, default paths, and size and timing limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Application constants organized by domain

/// Service identification used in logs
pub mod service_names {
    /// Name reported by the server binary
    pub const MCP_SSE_SERVER: &str = "mcp-sse-server";
}

/// SSE wire protocol constants
pub mod sse {
    /// Event carrying the POST endpoint URL, always first on the stream
    pub const ENDPOINT_EVENT: &str = "endpoint";
    /// Event carrying an outbound JSON-RPC message
    pub const MESSAGE_EVENT: &str = "message";
    /// Comment text written by the keep-alive ticker
    pub const KEEP_ALIVE_COMMENT: &str = "keepalive";
    /// Query parameter carrying the session id on the POST endpoint
    pub const SESSION_QUERY_PARAM: &str = "session";
    /// Content type of the event stream response
    pub const CONTENT_TYPE_EVENT_STREAM: &str = "text/event-stream";
    /// Cache directive for the event stream response
    pub const CACHE_CONTROL_NO_CACHE: &str = "no-cache";
    /// Connection hint for the event stream response
    pub const CONNECTION_KEEP_ALIVE: &str = "keep-alive";
    /// Cross-origin policy so browser-based MCP clients can connect
    pub const ALLOW_ORIGIN_ANY: &str = "*";
}

/// HTTP layer defaults
pub mod http {
    /// Default path for the SSE bootstrap GET
    pub const DEFAULT_SSE_PATH: &str = "/sse";
    /// Default path for the message ingress POST
    pub const DEFAULT_MESSAGE_PATH: &str = "/messages";
    /// Default HTTP port for the server binary
    pub const DEFAULT_HTTP_PORT: u16 = 8080;
    /// Required content type for inbound messages
    pub const CONTENT_TYPE_JSON: &str = "application/json";
}

/// Size and capacity limits
pub mod limits {
    /// Maximum accepted size of a POSTed JSON-RPC message
    pub const MAX_MESSAGE_SIZE: usize = 4 * 1024 * 1024; // 4MB
    /// Buffered chunks between the transport and the HTTP response body
    pub const SSE_CHANNEL_CAPACITY: usize = 64;
    /// Decoded messages queued per session ahead of the dispatcher
    pub const SESSION_INBOX_CAPACITY: usize = 32;
}

/// Timing constants
pub mod timeouts {
    /// Interval between keep-alive comments on an idle stream
    pub const SSE_KEEP_ALIVE_SECS: u64 = 15;
}
