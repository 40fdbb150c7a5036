//! Request middleware.
//!
//! # Data Flow
//! ```text
//! Request (x-request-id already set)
//!     → trace.rs (extract W3C context, open server span, attach RequestContext)
//!     → request_log.rs (started / completed / failed / cancelled records, metrics)
//!     → handler
//! ```

pub mod request_log;
pub mod trace;

pub use request_log::request_log_middleware;
pub use trace::trace_context_middleware;
