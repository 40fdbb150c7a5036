//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the process telemetry (logger factory, tracer, metrics recorder)
//! - Own the exporters until shutdown and flush them exactly once
//!
//! # Design Decisions
//! - Fail fast: a span exporter that cannot be built is a startup error
//! - A log exporter that cannot be built degrades to console-only logging
//! - Build before the Tokio runtime: the blocking OTLP HTTP client must not
//!   be created on a runtime thread

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use opentelemetry_sdk::trace::SdkTracer;

use crate::config::Settings;
use crate::observability::logging::{Logger, LoggerFactory};
use crate::observability::metrics;
use crate::observability::tracing::{init_tracer, TracerHandle};
use crate::observability::TelemetryError;

/// Process-wide telemetry. Dropping it flushes and closes every exporter.
pub struct Telemetry {
    settings: Arc<Settings>,
    loggers: LoggerFactory,
    tracer: Option<TracerHandle>,
    metrics: PrometheusHandle,
    shut_down: AtomicBool,
}

impl Telemetry {
    /// Build telemetry from settings.
    pub fn init(settings: Arc<Settings>) -> Result<Self, TelemetryError> {
        let tracer = init_tracer(&settings)?;
        let loggers = LoggerFactory::new(Arc::clone(&settings));
        Ok(Self::new(settings, loggers, tracer))
    }

    /// Assemble telemetry from parts.
    pub fn new(settings: Arc<Settings>, loggers: LoggerFactory, tracer: Option<TracerHandle>) -> Self {
        Self {
            settings,
            loggers,
            tracer,
            metrics: metrics::install(),
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// The service logger, built on first use.
    pub fn logger(&self) -> Logger {
        self.loggers.get_logger()
    }

    pub fn tracer(&self) -> Option<SdkTracer> {
        self.tracer.as_ref().map(|t| t.tracer().clone())
    }

    pub fn metrics(&self) -> PrometheusHandle {
        self.metrics.clone()
    }

    /// Flush and close exporters. Later calls do nothing.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(logger) = self.loggers.get() {
            crate::info!(logger, "Shutting down telemetry");
            logger.shutdown();
        }
        if let Some(tracer) = &self.tracer {
            tracer.shutdown();
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

impl Drop for Telemetry {
    fn drop(&mut self) {
        self.shutdown();
    }
}
