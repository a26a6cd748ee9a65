// ABOUTME: Lifecycle state machine for the SSE transport (created, started, closed)
// ABOUTME: Enforces forward-only transitions and reports whether a close actually happened
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::error::{TransportError, TransportResult};
use std::fmt;

/// Transport lifecycle state
///
/// Legal moves are `Created -> Started -> Closed` and `Created -> Closed`.
/// `Closed` is terminal and closing it again is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    /// Constructed, nothing written yet
    #[default]
    Created,
    /// Headers and endpoint event written, stream live
    Started,
    /// Torn down
    Closed,
}

impl TransportState {
    /// Check that `start` is legal from this state
    ///
    /// # Errors
    ///
    /// Returns `AlreadyStarted` from `Started` and `Closed` from `Closed`
    pub const fn ensure_startable(self) -> TransportResult<()> {
        match self {
            Self::Created => Ok(()),
            Self::Started => Err(TransportError::AlreadyStarted),
            Self::Closed => Err(TransportError::Closed),
        }
    }

    /// Move to `Started`
    ///
    /// # Errors
    ///
    /// Same as [`Self::ensure_startable`]; the state is left untouched on error
    pub fn start(&mut self) -> TransportResult<()> {
        self.ensure_startable()?;
        *self = Self::Started;
        Ok(())
    }

    /// Check that outbound writes are legal from this state
    ///
    /// # Errors
    ///
    /// Returns `NotStarted` before `start` and `Closed` after `close`
    pub const fn ensure_writable(self) -> TransportResult<()> {
        match self {
            Self::Started => Ok(()),
            Self::Created => Err(TransportError::NotStarted),
            Self::Closed => Err(TransportError::Closed),
        }
    }

    /// Move to `Closed`, returning `true` only for the call that performed the transition
    pub fn close(&mut self) -> bool {
        if *self == Self::Closed {
            return false;
        }
        *self = Self::Closed;
        true
    }

    /// Whether the state is terminal
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}
