// ABOUTME: Session identifier minted once per transport to correlate POSTs with their SSE stream
// ABOUTME: Wraps a random v4 UUID rendered in canonical 36-character form
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use uuid::Uuid;

/// Immutable correlation token embedded in the advertised POST endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Session {
    id: String,
}

impl Session {
    /// Mint a new session with a random v4 UUID
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
        }
    }

    /// Canonical hyphenated id (8-4-4-4-12 hex groups)
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
