//! Record enrichment stages.
//!
//! Enrichers run synchronously on the emitting task, before any sink sees
//! the record. A field the caller already set under the same name is never
//! overwritten.

use serde_json::Value;

use crate::observability::context::{current_trace_context, RequestContext};
use crate::observability::record::LogRecord;

/// A stage that adds contextual data to a record.
pub trait Enricher: Send + Sync {
    fn enrich(&self, record: &mut LogRecord, cx: Option<&RequestContext>);
}

/// Stamps `trace_id` / `span_id` from the request's active span.
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceEnricher;

impl Enricher for TraceEnricher {
    fn enrich(&self, record: &mut LogRecord, cx: Option<&RequestContext>) {
        let Some(cx) = cx else {
            return;
        };
        let (trace_id, span_id) = current_trace_context(cx);
        if !record.fields.contains_key("trace_id") {
            record.trace_id = trace_id;
        }
        if !record.fields.contains_key("span_id") {
            record.span_id = span_id;
        }
    }
}

/// Adds the `x-request-id` value as `request_id`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestIdEnricher;

impl Enricher for RequestIdEnricher {
    fn enrich(&self, record: &mut LogRecord, cx: Option<&RequestContext>) {
        if let Some(request_id) = cx.and_then(RequestContext::request_id) {
            record
                .fields
                .entry("request_id")
                .or_insert_with(|| Value::String(request_id.to_string()));
        }
    }
}
