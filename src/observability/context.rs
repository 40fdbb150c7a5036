//! Explicit per-request trace context.
//!
//! # Responsibilities
//! - Carry the active (or remote parent) span context for one request
//! - Expose its trace/span identifiers to the logging pipeline
//! - Extract / inject W3C `traceparent` headers
//!
//! # Design Decisions
//! - The context travels with the request (extensions, handler arguments);
//!   nothing here reads task-local or thread-local state
//! - Absence of a span is a normal state, reported as `(None, None)`

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use opentelemetry::propagation::{Extractor, Injector, TextMapPropagator};
use opentelemetry::trace::TraceContextExt;
use opentelemetry::Context;
use opentelemetry_sdk::propagation::TraceContextPropagator;

/// Trace state of one logical request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    otel: Context,
    request_id: Option<String>,
}

impl RequestContext {
    /// A context with no span and no request id.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(otel: Context) -> Self {
        Self {
            otel,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// The underlying OpenTelemetry context.
    pub fn otel(&self) -> &Context {
        &self.otel
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Whether a valid span context is active.
    pub fn has_span(&self) -> bool {
        self.otel.span().span_context().is_valid()
    }
}

/// Read the trace and span ids carried by `cx`, as lowercase hex.
pub fn current_trace_context(cx: &RequestContext) -> (Option<String>, Option<String>) {
    let span = cx.otel.span();
    let span_context = span.span_context();
    if !span_context.is_valid() {
        return (None, None);
    }
    (
        Some(span_context.trace_id().to_string()),
        Some(span_context.span_id().to_string()),
    )
}

struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

struct HeaderInjector<'a>(&'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            self.0.insert(name, value);
        }
    }
}

/// Parse an inbound W3C trace context. Missing or malformed headers yield an empty context.
pub fn extract_remote_context(headers: &HeaderMap) -> Context {
    TraceContextPropagator::new().extract(&HeaderExtractor(headers))
}

/// Write `traceparent`/`tracestate` for `cx` into outbound headers. No-op without a span.
pub fn inject_context(cx: &RequestContext, headers: &mut HeaderMap) {
    if !cx.has_span() {
        return;
    }
    TraceContextPropagator::new().inject_context(&cx.otel, &mut HeaderInjector(headers));
}
