//! Versioned HTTP API.
//!
//! # Routes (under `/api/v1`)
//! - `GET /health`: liveness probe
//! - `POST /pong`: answer a `Ping` with `Pong`
//! - `POST /ping`: send a `Ping` to another service and report its answer

pub mod health;
pub mod pingpong;

use axum::{
    routing::{get, post},
    Router,
};

use crate::http::server::AppState;

pub const API_V1_PREFIX: &str = "/api/v1";

/// Routes mounted under [`API_V1_PREFIX`].
pub fn setup_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ping", post(pingpong::handlers::ping))
        .route("/pong", post(pingpong::handlers::pong))
}
