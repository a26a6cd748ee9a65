// ABOUTME: Main library entry point for the MCP SSE transport server
// ABOUTME: Provides the duplex JSON-RPC transport over Server-Sent Events plus HTTP POST
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # MCP SSE Transport
//!
//! Server side of the Model Context Protocol SSE transport. Each client opens
//! a long-lived `text/event-stream` response; the server announces a
//! session-scoped POST URL in an `endpoint` event and then pushes JSON-RPC
//! messages as `message` events. Clients send their messages by POSTing to
//! the announced URL.
//!
//! ## Architecture
//!
//! - **Transport**: session id, event writer, lifecycle state machine,
//!   inbound decoding and the [`transport::SseTransport`] facade
//! - **Server**: axum routes, session registry and the dispatcher seam
//! - **JSON-RPC**: message envelope types
//! - **Config**: environment-driven server and transport settings
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use mcp_sse_transport::config::ServerConfig;
//! use mcp_sse_transport::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("SSE stream on {} port {}", config.sse_path, config.http_port);
//!     Ok(())
//! }
//! ```

/// Configuration management
pub mod config;

/// Application constants
pub mod constants;

/// Unified error handling
pub mod errors;

/// JSON-RPC 2.0 message types
pub mod jsonrpc;

/// Structured logging setup
pub mod logging;

/// HTTP routes and session routing
pub mod server;

/// SSE transport core
pub mod transport;
