//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::Value;
use tokio::net::TcpListener;

use pingpong_service::config::Settings;
use pingpong_service::http::HttpServer;
use pingpong_service::lifecycle::{Shutdown, Telemetry};
use pingpong_service::observability::sink::MemoryWriter;
use pingpong_service::observability::LoggerFactory;

pub const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
pub const PARENT_SPAN_ID: &str = "00f067aa0ba902b7";

pub fn traceparent() -> String {
    format!("00-{TRACE_ID}-{PARENT_SPAN_ID}-01")
}

/// Telemetry whose console output is captured in memory.
pub fn telemetry(settings: Settings) -> (Telemetry, MemoryWriter) {
    let settings = Arc::new(settings);
    let writer = MemoryWriter::new();
    let loggers = LoggerFactory::new(Arc::clone(&settings)).with_console_writer(writer.clone());
    (Telemetry::new(settings, loggers, None), writer)
}

/// Every captured console line, parsed.
pub fn records(writer: &MemoryWriter) -> Vec<Value> {
    writer
        .contents()
        .lines()
        .map(|line| serde_json::from_str(line).expect("console line is not JSON"))
        .collect()
}

pub fn with_message(records: &[Value], message: &str) -> Vec<Value> {
    records
        .iter()
        .filter(|r| r["message"] == message)
        .cloned()
        .collect()
}

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub writer: MemoryWriter,
    pub telemetry: Telemetry,
    shutdown: Shutdown,
}

impl TestServer {
    pub async fn start(settings: Settings) -> Self {
        let (telemetry, writer) = telemetry(settings.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let server = HttpServer::new(Arc::new(settings), &telemetry);
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        Self {
            addr,
            writer,
            telemetry,
            shutdown,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn records(&self) -> Vec<Value> {
        records(&self.writer)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}
