// ABOUTME: HTTP server configuration for the SSE bootstrap and message ingress routes
// ABOUTME: Handles port, route paths and the inbound message size ceiling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{env_var_or, TransportConfig};
use crate::constants::{http, limits};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Server configuration loaded from environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listener port
    pub http_port: u16,
    /// Path serving the SSE stream (GET)
    pub sse_path: String,
    /// Path accepting client messages (POST)
    pub message_path: String,
    /// Largest accepted POST body in bytes
    pub max_message_size: usize,
    /// Decoded messages a session may queue ahead of the dispatcher
    pub inbox_capacity: usize,
    /// Settings applied to each transport
    pub transport: TransportConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: http::DEFAULT_HTTP_PORT,
            sse_path: http::DEFAULT_SSE_PATH.to_owned(),
            message_path: http::DEFAULT_MESSAGE_PATH.to_owned(),
            max_message_size: limits::MAX_MESSAGE_SIZE,
            inbox_capacity: limits::SESSION_INBOX_CAPACITY,
            transport: TransportConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load server configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables are invalid or inconsistent
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            http_port: env_var_or("HTTP_PORT", &http::DEFAULT_HTTP_PORT.to_string())
                .parse()
                .map_err(|e| AppError::config(format!("Invalid HTTP_PORT value: {e}")))?,
            sse_path: env_var_or("SSE_PATH", http::DEFAULT_SSE_PATH),
            message_path: env_var_or("SSE_MESSAGE_PATH", http::DEFAULT_MESSAGE_PATH),
            max_message_size: env_var_or(
                "MCP_MAX_MESSAGE_SIZE",
                &limits::MAX_MESSAGE_SIZE.to_string(),
            )
            .parse()
            .map_err(|e| AppError::config(format!("Invalid MCP_MAX_MESSAGE_SIZE value: {e}")))?,
            inbox_capacity: env_var_or(
                "SSE_INBOX_CAPACITY",
                &limits::SESSION_INBOX_CAPACITY.to_string(),
            )
            .parse()
            .map_err(|e| AppError::config(format!("Invalid SSE_INBOX_CAPACITY value: {e}")))?,
            transport: TransportConfig::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error for relative or clashing paths and zero limits
    pub fn validate(&self) -> AppResult<()> {
        for (name, path) in [("SSE_PATH", &self.sse_path), ("SSE_MESSAGE_PATH", &self.message_path)] {
            if !path.starts_with('/') {
                return Err(AppError::config(format!(
                    "{name} must be an absolute path starting with '/', got {path:?}"
                )));
            }
            if path.contains('?') {
                return Err(AppError::config(format!(
                    "{name} must not contain a query string, got {path:?}"
                )));
            }
        }
        if self.sse_path == self.message_path {
            return Err(AppError::config(
                "SSE_PATH and SSE_MESSAGE_PATH must differ",
            ));
        }
        if self.max_message_size == 0 {
            return Err(AppError::config(
                "MCP_MAX_MESSAGE_SIZE must be greater than zero",
            ));
        }
        if self.inbox_capacity == 0 {
            return Err(AppError::config(
                "SSE_INBOX_CAPACITY must be greater than zero",
            ));
        }
        self.transport.validate()
    }

    /// One-line summary for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "port={} sse_path={} message_path={} max_message_size={} inbox_capacity={} keep_alive={:?}",
            self.http_port,
            self.sse_path,
            self.message_path,
            self.max_message_size,
            self.inbox_capacity,
            self.transport.keep_alive_interval
        )
    }
}
