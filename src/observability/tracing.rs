//! Distributed tracing support.
//!
//! # Responsibilities
//! - Build the OTLP span exporter when a collector endpoint is configured
//! - Hand the HTTP layer a tracer for server spans
//! - Flush and close the exporter at shutdown
//!
//! # Design Decisions
//! - Optional: without `OTLP_ENDPOINT` no spans are created and inbound
//!   W3C context is only propagated
//! - Batch export runs on the SDK's own thread, off the request path

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};
use opentelemetry_sdk::Resource;

use crate::config::Settings;
use crate::observability::TelemetryError;

/// Owns the tracer provider for the life of the process.
#[derive(Clone)]
pub struct TracerHandle {
    provider: SdkTracerProvider,
    tracer: SdkTracer,
}

impl TracerHandle {
    /// Exporter posting spans to `{endpoint}/v1/traces`.
    pub fn otlp(service_name: &str, endpoint: &str) -> Result<Self, TelemetryError> {
        let exporter = SpanExporter::builder()
            .with_http()
            .with_endpoint(format!("{}/v1/traces", endpoint.trim_end_matches('/')))
            .build()
            .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

        let provider = SdkTracerProvider::builder()
            .with_resource(
                Resource::builder()
                    .with_service_name(service_name.to_string())
                    .build(),
            )
            .with_batch_exporter(exporter)
            .build();

        Ok(Self::from_provider(provider, service_name))
    }

    pub fn from_provider(provider: SdkTracerProvider, service_name: &str) -> Self {
        let tracer = provider.tracer(service_name.to_string());
        Self { provider, tracer }
    }

    pub fn tracer(&self) -> &SdkTracer {
        &self.tracer
    }

    pub fn shutdown(&self) {
        let _ = self.provider.force_flush();
        let _ = self.provider.shutdown();
    }
}

/// Build the tracer from settings; `None` when no endpoint is configured.
pub fn init_tracer(settings: &Settings) -> Result<Option<TracerHandle>, TelemetryError> {
    settings
        .otlp_endpoint
        .as_deref()
        .map(|endpoint| TracerHandle::otlp(&settings.service_name, endpoint))
        .transpose()
}
