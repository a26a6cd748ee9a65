// ABOUTME: Configuration management for the SSE transport and its HTTP server
// ABOUTME: Loads settings from environment variables with validated defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! - **Transport**: per-stream settings (channel capacity, keep-alive)
//! - **Server**: HTTP listener, route paths and the inbound size ceiling

use std::env;

/// HTTP server configuration
pub mod server;
/// Per-transport stream configuration
pub mod transport;

pub use server::ServerConfig;
pub use transport::TransportConfig;

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}
