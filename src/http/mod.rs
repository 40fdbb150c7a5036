//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, panic recovery, timeout)
//!     → request.rs (x-request-id generated / echoed)
//!     → middleware/trace.rs (W3C context, server span)
//!     → middleware/request_log.rs (request/response records, metrics)
//!     → api handlers
//! ```

pub mod middleware;
pub mod request;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
