//! Trace context middleware.
//!
//! Extracts the inbound W3C context and, when a tracer is configured, opens
//! a server span as its child. The resulting [`RequestContext`] is stored in
//! the request extensions for the logging middleware and handlers.

use std::convert::Infallible;

use axum::{
    body::Body,
    extract::{FromRequestParts, MatchedPath, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::{SpanKind, TraceContextExt, Tracer};
use opentelemetry::KeyValue;
use opentelemetry_sdk::trace::SdkTracer;

use crate::http::request::RequestIdExt;
use crate::observability::context::{extract_remote_context, RequestContext};

pub async fn trace_context_middleware(
    State(tracer): State<Option<SdkTracer>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let parent = extract_remote_context(req.headers());

    let otel = match &tracer {
        Some(tracer) => {
            let method = req.method().to_string();
            let route = req
                .extensions()
                .get::<MatchedPath>()
                .map(|p| p.as_str().to_string())
                .unwrap_or_else(|| req.uri().path().to_string());
            let span = tracer
                .span_builder(format!("{method} {route}"))
                .with_kind(SpanKind::Server)
                .with_attributes(vec![
                    KeyValue::new("http.request.method", method),
                    KeyValue::new("url.path", req.uri().path().to_string()),
                ])
                .start_with_context(tracer, &parent);
            parent.with_span(span)
        }
        None => parent,
    };

    let mut cx = RequestContext::new(otel);
    if let Some(request_id) = req.request_id() {
        cx = cx.with_request_id(request_id);
    }
    req.extensions_mut().insert(cx.clone());

    let response = next.run(req).await;

    if tracer.is_some() {
        let span = cx.otel().span();
        span.set_attribute(KeyValue::new(
            "http.response.status_code",
            i64::from(response.status().as_u16()),
        ));
        span.end();
    }

    response
}

/// Handlers take the request's trace context as an argument.
/// Outside the middleware the context is empty.
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default())
    }
}
