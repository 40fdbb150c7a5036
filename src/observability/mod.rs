//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Log call (Logger / Entry) or dependency tracing event (bridge.rs)
//!     → record.rs (LogRecord: level, logger, message, extras)
//!     → enrich.rs (trace_id / span_id / request_id from RequestContext)
//!     → sink.rs, per sink threshold:
//!         → ConsoleSink → format.rs (JSON line or pretty) → stdout
//!         → OtlpSink → batch processor → collector {endpoint}/v1/logs
//!
//! HTTP middleware:
//!     → tracing.rs (server spans, W3C context propagation)
//!     → metrics.rs (request counters and latency histograms)
//! ```
//!
//! # Design Decisions
//! - Trace context is an explicit value ([`context::RequestContext`]), never ambient
//! - One pipeline per process, built lazily by [`logging::LoggerFactory`]
//! - Remote export is optional; without an endpoint the console is the only sink
//! - Exporter failures degrade to console-only logging, they never stop the service

pub mod bridge;
pub mod context;
pub mod enrich;
pub mod format;
pub mod logging;
mod macros;
pub mod metrics;
pub mod record;
pub mod sink;
pub mod tracing;

pub use context::{current_trace_context, RequestContext};
pub use logging::{Logger, LoggerFactory};
pub use record::{Level, LogRecord};

/// Errors raised while building telemetry exporters.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("failed to build OTLP exporter: {0}")]
    Exporter(String),
}
