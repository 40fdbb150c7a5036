//! Request/response logging middleware.
//!
//! Every request produces a `HTTP request started` record and exactly one
//! terminal record: `completed`, `failed` (handler panic, re-raised after
//! logging) or `cancelled` (future dropped, e.g. client abort or timeout).

use std::any::Any;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, MatchedPath, State},
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use futures_util::FutureExt;

use crate::observability::context::RequestContext;
use crate::observability::logging::Logger;
use crate::observability::metrics;

/// Milliseconds rounded to two decimals.
fn millis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100_000.0).round() / 100.0
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

fn full_url(req: &Request<Body>) -> String {
    let uri = req.uri();
    if uri.scheme().is_some() {
        return uri.to_string();
    }
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let path_and_query = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    format!("http://{host}{path_and_query}")
}

/// Logs `HTTP request cancelled` if dropped while armed.
struct CompletionGuard {
    logger: Logger,
    cx: RequestContext,
    method: String,
    path: String,
    start: Instant,
    armed: bool,
}

impl CompletionGuard {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        crate::warning!(
            self.logger,
            cx = &self.cx,
            req_method = &self.method,
            req_path = &self.path,
            response_time_ms = millis(self.start.elapsed()),
            "HTTP request cancelled"
        );
    }
}

pub async fn request_log_middleware(
    State(logger): State<Logger>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let cx = req
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default();

    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let client_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    crate::info!(
        logger,
        cx = &cx,
        req_method = &method,
        req_url = full_url(&req),
        req_path = &path,
        req_query = req.uri().query(),
        client_ip = client_ip,
        user_agent = user_agent,
        "HTTP request started"
    );

    let mut guard = CompletionGuard {
        logger: logger.clone(),
        cx: cx.clone(),
        method: method.clone(),
        path: path.clone(),
        start,
        armed: true,
    };

    let outcome = AssertUnwindSafe(next.run(req)).catch_unwind().await;
    guard.disarm();

    match outcome {
        Ok(response) => {
            let status = response.status().as_u16();
            crate::info!(
                logger,
                cx = &cx,
                req_method = &method,
                req_path = &path,
                res_status_code = status,
                response_time_ms = millis(start.elapsed()),
                "HTTP request completed"
            );
            metrics::record_request(&method, &route, status, start);
            response
        }
        Err(payload) => {
            crate::error!(
                logger,
                cx = &cx,
                req_method = &method,
                req_path = &path,
                err = %panic_message(payload.as_ref()),
                response_time_ms = millis(start.elapsed()),
                "HTTP request failed"
            );
            metrics::record_request(&method, &route, 500, start);
            std::panic::resume_unwind(payload)
        }
    }
}
