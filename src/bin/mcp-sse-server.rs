// ABOUTME: Server binary exposing the MCP SSE transport over HTTP
// ABOUTME: Loads configuration, installs logging and serves the SSE and message routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # MCP SSE Server Binary
//!
//! Serves `GET /sse` and `POST /messages?session=<id>` with a dispatcher that
//! answers `ping`.

use anyhow::Result;
use clap::Parser;
use mcp_sse_transport::{
    config::ServerConfig,
    logging,
    server::{EchoDispatcher, SessionRegistry, SseRoutes, SseState},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "mcp-sse-server")]
#[command(about = "MCP server speaking JSON-RPC over Server-Sent Events")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override the SSE stream path
    #[arg(long)]
    sse_path: Option<String>,

    /// Override the message POST path
    #[arg(long)]
    message_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(sse_path) = args.sse_path {
        config.sse_path = sse_path;
    }
    if let Some(message_path) = args.message_path {
        config.message_path = message_path;
    }
    config.validate()?;

    info!("Starting MCP SSE server");
    info!("{}", config.summary());

    let registry = SessionRegistry::new();
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let state = SseState::new(config, registry.clone(), Arc::new(EchoDispatcher));
    let app = SseRoutes::routes(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(registry))
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Wait for Ctrl+C, then close every open stream so in-flight responses finish
async fn shutdown_signal(registry: SessionRegistry) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
    info!(sessions = registry.len(), "Shutdown requested, closing sessions");
    registry.close_all();
}
