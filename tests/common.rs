// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, transport construction and polling helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `mcp_sse_transport`

use mcp_sse_transport::config::TransportConfig;
use mcp_sse_transport::transport::{NoopLogger, ResponseSink, SseTransport};
use std::future::Future;
use std::sync::{Arc, Once};
use std::time::Duration;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // Check for TEST_LOG environment variable to control test logging level
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Transport config without keep-alive so output is deterministic
pub fn quiet_config() -> TransportConfig {
    TransportConfig {
        channel_capacity: 16,
        keep_alive_interval: None,
    }
}

/// Build a transport over `sink` with keep-alive disabled
pub fn create_test_transport<S: ResponseSink + 'static>(sink: S) -> SseTransport<S> {
    init_test_logging();
    SseTransport::with_config("/messages", sink, quiet_config(), Arc::new(NoopLogger))
        .expect("sink supports flushing")
}

/// Poll `condition` until it holds or two seconds pass
pub async fn wait_until<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Await `future` with a test-sized timeout
pub async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("operation timed out")
}
