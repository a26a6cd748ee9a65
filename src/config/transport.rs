// ABOUTME: Per-transport stream configuration (response channel capacity and keep-alive cadence)
// ABOUTME: Loaded from SSE_* environment variables with constants as defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::env_var_or;
use crate::constants::{limits, timeouts};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// SSE stream configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Flushed chunks buffered between the transport and the response body
    pub channel_capacity: usize,
    /// Interval between keep-alive comments; `None` disables them
    pub keep_alive_interval: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            channel_capacity: limits::SSE_CHANNEL_CAPACITY,
            keep_alive_interval: Some(Duration::from_secs(timeouts::SSE_KEEP_ALIVE_SECS)),
        }
    }
}

impl TransportConfig {
    /// Load SSE configuration from environment
    ///
    /// `SSE_KEEP_ALIVE_SECS=0` disables keep-alive comments.
    ///
    /// # Errors
    ///
    /// Returns an error if SSE environment variables are invalid
    pub fn from_env() -> AppResult<Self> {
        let channel_capacity = env_var_or(
            "SSE_CHANNEL_CAPACITY",
            &limits::SSE_CHANNEL_CAPACITY.to_string(),
        )
        .parse()
        .map_err(|e| AppError::config(format!("Invalid SSE_CHANNEL_CAPACITY value: {e}")))?;

        let keep_alive_secs: u64 = env_var_or(
            "SSE_KEEP_ALIVE_SECS",
            &timeouts::SSE_KEEP_ALIVE_SECS.to_string(),
        )
        .parse()
        .map_err(|e| AppError::config(format!("Invalid SSE_KEEP_ALIVE_SECS value: {e}")))?;

        let config = Self {
            channel_capacity,
            keep_alive_interval: (keep_alive_secs > 0).then(|| Duration::from_secs(keep_alive_secs)),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if the channel capacity is zero
    pub fn validate(&self) -> AppResult<()> {
        if self.channel_capacity == 0 {
            return Err(AppError::config(
                "SSE_CHANNEL_CAPACITY must be greater than zero",
            ));
        }
        Ok(())
    }
}
