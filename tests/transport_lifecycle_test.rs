// ABOUTME: Integration tests for the SSE transport lifecycle (start, send, close)
// ABOUTME: Validates stream headers, endpoint advertisement, ordering and close semantics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use common::{create_test_transport, quiet_config, wait_until, within};
use helpers::recording_sink::RecordingSink;
use mcp_sse_transport::config::TransportConfig;
use mcp_sse_transport::jsonrpc::{JsonRpcMessage, JsonRpcRequest, JsonRpcResponse};
use mcp_sse_transport::transport::{
    NoopLogger, SseTransport, TransportError, TransportState,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn ping(id: i64) -> JsonRpcMessage {
    JsonRpcRequest::with_id("ping", None, json!(id)).into()
}

fn counting_close_handler(transport: &mut SseTransport<RecordingSink>) -> Arc<AtomicUsize> {
    let closes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&closes);
    transport.set_close_handler(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    closes
}

#[tokio::test]
async fn test_start_writes_headers_and_endpoint_event() {
    let sink = RecordingSink::new();
    let transport = Arc::new(create_test_transport(sink.clone()));

    transport.start(CancellationToken::new()).await.unwrap();

    let headers = sink.headers().expect("headers written");
    assert_eq!(headers["content-type"], "text/event-stream");
    assert_eq!(headers["cache-control"], "no-cache");
    assert_eq!(headers["connection"], "keep-alive");
    assert_eq!(headers["access-control-allow-origin"], "*");

    let expected = format!(
        "event: endpoint\ndata: /messages?session={}\n\n",
        transport.session_id()
    );
    assert_eq!(sink.output(), expected);
    assert_eq!(sink.flushes(), 1);
    assert_eq!(transport.state(), TransportState::Started);
}

#[tokio::test]
async fn test_session_ids_are_unique_uuids() {
    let ids: HashSet<String> = (0..50)
        .map(|_| create_test_transport(RecordingSink::new()).session_id().to_owned())
        .collect();
    assert_eq!(ids.len(), 50);
    for id in &ids {
        assert_eq!(id.len(), 36);
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }
}

#[tokio::test]
async fn test_second_start_fails_without_writing() {
    let sink = RecordingSink::new();
    let transport = Arc::new(create_test_transport(sink.clone()));
    transport.start(CancellationToken::new()).await.unwrap();
    let before = sink.output();

    let err = transport.start(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, TransportError::AlreadyStarted));
    assert_eq!(err.to_string(), "transport already started");
    assert_eq!(sink.output(), before);
    assert_eq!(sink.flushes(), 1);
}

#[tokio::test]
async fn test_send_writes_message_event() {
    let sink = RecordingSink::new();
    let transport = Arc::new(create_test_transport(sink.clone()));
    transport.start(CancellationToken::new()).await.unwrap();

    let reply: JsonRpcMessage = JsonRpcResponse::success(Some(json!(1)), json!({})).into();
    transport.send(&reply).await.unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].0, "message");
    let payload: Value = serde_json::from_str(&events[1].1).unwrap();
    assert_eq!(payload, json!({"jsonrpc": "2.0", "result": {}, "id": 1}));
    assert_eq!(sink.flushes(), 2);
}

#[tokio::test]
async fn test_send_before_start_is_rejected() {
    let sink = RecordingSink::new();
    let transport = create_test_transport(sink.clone());

    let err = transport.send(&ping(1)).await.unwrap_err();
    assert!(matches!(err, TransportError::NotStarted));
    assert!(sink.output().is_empty());
}

#[tokio::test]
async fn test_send_after_close_is_rejected() {
    let sink = RecordingSink::new();
    let transport = Arc::new(create_test_transport(sink.clone()));
    transport.start(CancellationToken::new()).await.unwrap();
    transport.close().unwrap();
    let before = sink.output();

    let err = transport.send(&ping(1)).await.unwrap_err();
    assert!(matches!(err, TransportError::Closed));
    assert_eq!(err.to_string(), "transport closed");
    assert_eq!(sink.output(), before);
}

#[tokio::test]
async fn test_start_after_close_is_rejected() {
    let sink = RecordingSink::new();
    let transport = Arc::new(create_test_transport(sink.clone()));
    transport.close().unwrap();

    let err = transport.start(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, TransportError::Closed));
    assert!(sink.headers().is_none());
    assert!(sink.output().is_empty());
}

#[tokio::test]
async fn test_close_is_idempotent_and_fires_handler_once() {
    let mut transport = create_test_transport(RecordingSink::new());
    let closes = counting_close_handler(&mut transport);
    let transport = Arc::new(transport);
    transport.start(CancellationToken::new()).await.unwrap();

    transport.close().unwrap();
    transport.close().unwrap();
    transport.close().unwrap();

    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert!(transport.is_closed());
    assert!(transport.shutdown_token().is_cancelled());
}

#[tokio::test]
async fn test_close_without_start() {
    let mut transport = create_test_transport(RecordingSink::new());
    let closes = counting_close_handler(&mut transport);

    transport.close().unwrap();

    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert_eq!(transport.state(), TransportState::Closed);
}

#[tokio::test]
async fn test_concurrent_close_fires_handler_once() {
    let mut transport = create_test_transport(RecordingSink::new());
    let closes = counting_close_handler(&mut transport);
    let transport = Arc::new(transport);
    transport.start(CancellationToken::new()).await.unwrap();

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let transport = Arc::clone(&transport);
            tokio::spawn(async move { transport.close() })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancelling_context_closes_transport() {
    let mut transport = create_test_transport(RecordingSink::new());
    let closes = counting_close_handler(&mut transport);
    let transport = Arc::new(transport);
    let ctx = CancellationToken::new();
    transport.start(ctx.clone()).await.unwrap();

    ctx.cancel();

    assert!(wait_until(|| transport.is_closed()).await);
    assert!(wait_until(|| closes.load(Ordering::SeqCst) == 1).await);
    let err = transport.send(&ping(1)).await.unwrap_err();
    assert!(matches!(err, TransportError::Closed));

    // Explicit close after the context fired is a no-op
    transport.close().unwrap();
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_sequential_sends_arrive_in_order() {
    let sink = RecordingSink::new();
    let transport = Arc::new(create_test_transport(sink.clone()));
    transport.start(CancellationToken::new()).await.unwrap();

    for id in 0..20 {
        transport.send(&ping(id)).await.unwrap();
    }

    let ids: Vec<i64> = sink
        .events()
        .iter()
        .skip(1)
        .map(|(_, data)| serde_json::from_str::<Value>(data).unwrap()["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, (0..20).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_concurrent_sends_never_interleave_frames() {
    let sink = RecordingSink::new();
    let transport = Arc::new(create_test_transport(sink.clone()));
    transport.start(CancellationToken::new()).await.unwrap();

    let tasks: Vec<_> = (0..32)
        .map(|id| {
            let transport = Arc::clone(&transport);
            tokio::spawn(async move { transport.send(&ping(id)).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let events = sink.events();
    assert_eq!(events.len(), 33);
    let mut ids: Vec<i64> = events[1..]
        .iter()
        .map(|(event, data)| {
            assert_eq!(event, "message");
            serde_json::from_str::<Value>(data).unwrap()["id"].as_i64().unwrap()
        })
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..32).collect::<Vec<_>>());
    assert_eq!(sink.flushes(), 33);
}

#[tokio::test]
async fn test_write_failure_surfaces_to_sender() {
    let sink = RecordingSink::new();
    let transport = Arc::new(create_test_transport(sink.clone()));
    transport.start(CancellationToken::new()).await.unwrap();

    sink.fail_writes();
    let err = transport.send(&ping(1)).await.unwrap_err();
    assert!(matches!(err, TransportError::Write(_)));
    // A failed write leaves the state machine alone
    assert_eq!(transport.state(), TransportState::Started);
}

#[tokio::test]
async fn test_start_fails_when_client_already_gone() {
    let sink = RecordingSink::new();
    sink.fail_writes();
    let transport = Arc::new(create_test_transport(sink));

    let err = transport.start(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, TransportError::Write(_)));
    assert_eq!(transport.state(), TransportState::Created);
}

#[tokio::test]
async fn test_non_streaming_sink_is_refused() {
    let result = SseTransport::with_config(
        "/messages",
        RecordingSink::buffered_only(),
        quiet_config(),
        Arc::new(NoopLogger),
    );
    assert!(matches!(result, Err(TransportError::StreamingUnsupported)));
}

#[tokio::test]
async fn test_keep_alive_comments_are_written() {
    let sink = RecordingSink::new();
    let config = TransportConfig {
        channel_capacity: 16,
        keep_alive_interval: Some(Duration::from_millis(20)),
    };
    let transport = Arc::new(
        SseTransport::with_config("/messages", sink.clone(), config, Arc::new(NoopLogger))
            .unwrap(),
    );
    transport.start(CancellationToken::new()).await.unwrap();

    assert!(wait_until(|| sink.output().contains(": keepalive\n\n")).await);
    // Comments are not events
    assert_eq!(sink.events().len(), 1);

    transport.close().unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    let after_close = sink.output();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(sink.output(), after_close);
}

#[tokio::test]
async fn test_dropping_transport_cancels_shutdown_token() {
    let transport = Arc::new(create_test_transport(RecordingSink::new()));
    transport.start(CancellationToken::new()).await.unwrap();
    let shutdown = transport.shutdown_token();

    drop(transport);

    within(shutdown.cancelled()).await;
}

#[tokio::test]
async fn test_dropping_transport_skips_close_handler() {
    let mut transport = create_test_transport(RecordingSink::new());
    let closes = counting_close_handler(&mut transport);
    let transport = Arc::new(transport);
    transport.start(CancellationToken::new()).await.unwrap();
    let shutdown = transport.shutdown_token();

    drop(transport);

    within(shutdown.cancelled()).await;
    assert_eq!(closes.load(Ordering::SeqCst), 0);
}
