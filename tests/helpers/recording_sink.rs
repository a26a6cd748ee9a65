// ABOUTME: In-memory response sink recording headers, bytes and flushes for transport tests
// ABOUTME: Supports failure injection and non-streaming mode to exercise error paths

use async_trait::async_trait;
use axum::http::HeaderMap;
use mcp_sse_transport::transport::ResponseSink;
use std::io;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorded {
    headers: Option<HeaderMap>,
    written: Vec<u8>,
    flushes: usize,
    fail_writes: bool,
}

/// Sink whose clones share one recording
#[derive(Clone)]
pub struct RecordingSink {
    recorded: Arc<Mutex<Recorded>>,
    streaming: bool,
}

impl RecordingSink {
    /// Streaming sink
    pub fn new() -> Self {
        Self {
            recorded: Arc::default(),
            streaming: true,
        }
    }

    /// Sink that cannot flush before the response ends
    #[allow(dead_code)]
    pub fn buffered_only() -> Self {
        Self {
            recorded: Arc::default(),
            streaming: false,
        }
    }

    /// Make every later write fail as if the client hung up
    #[allow(dead_code)]
    pub fn fail_writes(&self) {
        self.recorded.lock().unwrap().fail_writes = true;
    }

    /// Everything written so far
    pub fn output(&self) -> String {
        String::from_utf8(self.recorded.lock().unwrap().written.clone()).unwrap()
    }

    /// Headers set by the transport, if any
    #[allow(dead_code)]
    pub fn headers(&self) -> Option<HeaderMap> {
        self.recorded.lock().unwrap().headers.clone()
    }

    /// Number of flushes
    #[allow(dead_code)]
    pub fn flushes(&self) -> usize {
        self.recorded.lock().unwrap().flushes
    }

    /// Named events as `(event, data)` pairs, skipping comments
    ///
    /// Multiple `data:` lines are joined with `\n`.
    #[allow(dead_code)]
    pub fn events(&self) -> Vec<(String, String)> {
        let output = self.output();
        output
            .split("\n\n")
            .filter(|frame| !frame.is_empty())
            .filter_map(|frame| {
                let mut event = None;
                let mut data: Vec<&str> = Vec::new();
                for line in frame.lines() {
                    if let Some(name) = line.strip_prefix("event: ") {
                        event = Some(name.to_owned());
                    } else if let Some(value) = line.strip_prefix("data: ") {
                        data.push(value);
                    }
                }
                event.map(|event| (event, data.join("\n")))
            })
            .collect()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponseSink for RecordingSink {
    fn supports_flush(&self) -> bool {
        self.streaming
    }

    fn write_headers(&mut self, headers: HeaderMap) -> io::Result<()> {
        let mut recorded = self.recorded.lock().unwrap();
        if recorded.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "client gone"));
        }
        recorded.headers = Some(headers);
        Ok(())
    }

    async fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut recorded = self.recorded.lock().unwrap();
        if recorded.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "client gone"));
        }
        recorded.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    async fn flush(&mut self) -> io::Result<()> {
        let mut recorded = self.recorded.lock().unwrap();
        if recorded.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "client gone"));
        }
        recorded.flushes += 1;
        Ok(())
    }
}
