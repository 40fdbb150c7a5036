//! Ping/pong service.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ CatchPanic ─▶ Timeout ─▶ RequestId ─▶ TraceContext ─▶ RequestLog ─▶ /api/v1/*
//!                                                        │               │
//!                                                        ▼               ▼
//!                                                  server spans     Logger pipeline
//!                                                  (OTLP traces)    enrich → format → sinks
//!                                                                        │
//!                                                         stdout ◀───────┴───────▶ OTLP logs
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use pingpong_service::config::{load_settings, Settings};
use pingpong_service::http::HttpServer;
use pingpong_service::lifecycle::{shutdown_signal, Shutdown, Telemetry};
use pingpong_service::observability::bridge::install_dependency_bridge;
use pingpong_service::observability::Logger;
use pingpong_service::{critical, info};

#[derive(Parser, Debug)]
#[command(name = "pingpong-service", version, about)]
struct Cli {
    /// TOML file layered under the environment.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let settings = Arc::new(load_settings(cli.config.as_deref())?);

    let telemetry = Telemetry::init(Arc::clone(&settings))?;
    let logger = telemetry.logger();
    install_dependency_bridge(logger.clone(), &settings.log.dependency_level);

    info!(
        logger,
        service_name = &settings.service_name,
        bind_address = settings.bind_address(),
        request_timeout_secs = settings.request_timeout_secs,
        console_format = settings.log.console_format,
        "Configuration loaded"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(serve(Arc::clone(&settings), &telemetry, &logger));
    drop(runtime);

    if let Err(e) = &result {
        critical!(logger, err = e.as_ref(), "Error starting API");
    }

    info!(logger, "Shutdown complete");
    telemetry.shutdown();
    result
}

async fn serve(settings: Arc<Settings>, telemetry: &Telemetry, logger: &Logger) -> Result<(), Box<dyn Error>> {
    info!(logger, port = settings.port, "Starting application on port");

    let listener = TcpListener::bind(settings.bind_address()).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(Arc::clone(&settings), telemetry);
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut server_task => {
            result??;
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }
    info!(logger, "Shutdown signal received");
    shutdown.trigger();

    server_task.await??;
    Ok(())
}
