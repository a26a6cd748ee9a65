// ABOUTME: SSE framing and the event writer that pushes one flushed frame per event
// ABOUTME: Splits multi-line payloads into data lines and rejects names that would break framing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Event Writer.
//!
//! Framing is pure ([`format_event`], [`format_comment`]) so it can be tested
//! without a sink. [`write_event`] takes `&mut` access to the sink: it is not
//! synchronized on its own, the caller holds the transport's write lock.

use super::error::{TransportError, TransportResult};
use super::sink::ResponseSink;
use std::io;

/// Reject event names that are empty or contain line breaks
///
/// # Errors
///
/// Returns `InvalidEventName` for names that would corrupt the stream
pub fn validate_event_name(name: &str) -> TransportResult<()> {
    if name.is_empty() || name.contains(['\n', '\r']) {
        return Err(TransportError::InvalidEventName(name.to_owned()));
    }
    Ok(())
}

/// Frame a named event in SSE wire format
///
/// Each line of `payload` becomes its own `data:` line; `\r\n`, `\n` and a
/// lone `\r` all count as line breaks. An empty payload yields one empty
/// `data:` line so the event is still dispatched by clients.
#[must_use]
pub fn format_event(name: &str, payload: &str) -> String {
    let mut frame = String::with_capacity(name.len() + payload.len() + 16);
    frame.push_str("event: ");
    frame.push_str(name);
    frame.push('\n');
    for line in payload_lines(payload) {
        frame.push_str("data: ");
        frame.push_str(line);
        frame.push('\n');
    }
    frame.push('\n');
    frame
}

/// Frame an SSE comment, ignored by clients
#[must_use]
pub fn format_comment(text: &str) -> String {
    let mut frame = String::with_capacity(text.len() + 4);
    for line in payload_lines(text) {
        frame.push_str(": ");
        frame.push_str(line);
        frame.push('\n');
    }
    frame.push('\n');
    frame
}

fn payload_lines(payload: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(payload);
    std::iter::from_fn(move || {
        let current = rest?;
        match current.find(['\r', '\n']) {
            Some(pos) => {
                let skip = if current[pos..].starts_with("\r\n") { 2 } else { 1 };
                rest = Some(&current[pos + skip..]);
                Some(&current[..pos])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

/// Write one named event and flush it
///
/// # Errors
///
/// Returns `InvalidEventName` for a bad name and `Write` when the sink fails
pub async fn write_event<S>(sink: &mut S, name: &str, payload: &str) -> TransportResult<usize>
where
    S: ResponseSink + ?Sized,
{
    validate_event_name(name)?;
    write_frame(sink, format_event(name, payload).as_bytes()).await
}

/// Write one comment frame and flush it
///
/// # Errors
///
/// Returns `Write` when the sink fails
pub async fn write_comment<S>(sink: &mut S, text: &str) -> TransportResult<usize>
where
    S: ResponseSink + ?Sized,
{
    write_frame(sink, format_comment(text).as_bytes()).await
}

async fn write_frame<S>(sink: &mut S, frame: &[u8]) -> TransportResult<usize>
where
    S: ResponseSink + ?Sized,
{
    let mut written = 0;
    while written < frame.len() {
        let n = sink
            .write(&frame[written..])
            .await
            .map_err(TransportError::Write)?;
        if n == 0 {
            return Err(TransportError::Write(io::Error::new(
                io::ErrorKind::WriteZero,
                "sink accepted no bytes",
            )));
        }
        written += n;
    }
    sink.flush().await.map_err(TransportError::Write)?;
    Ok(written)
}
