//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the API and metrics handlers
//! - Wire up middleware (panic recovery, timeout, request ID, trace context, logging)
//! - Bind server to listener and drain on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use opentelemetry_sdk::trace::SdkTracer;
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer};

use crate::api::{setup_api_router, API_V1_PREFIX};
use crate::config::Settings;
use crate::http::middleware::{request_log_middleware, trace_context_middleware};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::{ShutdownListener, Telemetry};
use crate::observability::{metrics, Logger};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub logger: Logger,
    pub client: reqwest::Client,
    pub metrics: PrometheusHandle,
}

/// HTTP server for the service.
pub struct HttpServer {
    router: Router,
    logger: Logger,
}

impl HttpServer {
    /// Create a new HTTP server from settings and the process telemetry.
    pub fn new(settings: Arc<Settings>, telemetry: &Telemetry) -> Self {
        let logger = telemetry.logger();
        let state = AppState {
            settings: Arc::clone(&settings),
            logger: logger.clone(),
            client: reqwest::Client::new(),
            metrics: telemetry.metrics(),
        };

        let routes = Router::new()
            .nest(API_V1_PREFIX, setup_api_router())
            .route("/metrics", get(metrics_handler))
            .with_state(state);
        let router = apply_middleware(routes, &settings, logger.clone(), telemetry.tracer());

        Self { router, logger }
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` is triggered.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownListener,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        crate::info!(self.logger, address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        crate::info!(self.logger, "HTTP server stopped");
        Ok(())
    }
}

/// Wrap `routes` in the middleware stack, outermost first:
/// panic recovery, timeout, request ID, trace context, request logging.
#[allow(deprecated)]
pub fn apply_middleware(
    routes: Router,
    settings: &Settings,
    logger: Logger,
    tracer: Option<SdkTracer>,
) -> Router {
    routes
        .layer(middleware::from_fn_with_state(logger, request_log_middleware))
        .layer(middleware::from_fn_with_state(tracer, trace_context_middleware))
        .layer(propagate_request_id_layer())
        .layer(set_request_id_layer())
        .layer(TimeoutLayer::new(Duration::from_secs(
            settings.request_timeout_secs,
        )))
        .layer(CatchPanicLayer::new())
}

async fn metrics_handler(State(state): State<AppState>) -> String {
    metrics::render(&state.metrics)
}
