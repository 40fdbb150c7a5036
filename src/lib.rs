//! Ping/pong web service with trace-correlated structured logging.

pub mod api;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::Settings;
pub use http::HttpServer;
pub use lifecycle::{Shutdown, Telemetry};
pub use observability::{Logger, LoggerFactory, RequestContext};
