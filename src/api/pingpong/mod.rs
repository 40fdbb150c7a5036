//! Ping/pong exchange between two instances of the service.
//!
//! # Data Flow
//! ```text
//! client → POST /api/v1/ping {url}
//!     → POST {url}/api/v1/pong {"message": "Ping"} (traceparent injected)
//!     ← {"message": "Pong"}
//! client ← {"success": true, "response_message": "Pong"}
//! ```

pub mod handlers;
pub mod models;
