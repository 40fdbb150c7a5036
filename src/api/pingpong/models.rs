//! Request and response bodies.

use serde::{Deserialize, Serialize};

pub const PING: &str = "Ping";
pub const PONG: &str = "Pong";
pub const INVALID_PING: &str = "Message must be \"Ping\" to receive \"Pong\" response";

/// Body of `POST /pong`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingRequest {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PongResponse {
    pub message: String,
}

/// Body of `POST /ping`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendPingRequest {
    /// Base URL of the target service.
    pub url: String,
    #[serde(default = "default_ping_message")]
    pub message: String,
}

fn default_ping_message() -> String {
    PING.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendPingResponse {
    pub success: bool,
    pub response_message: Option<String>,
}

impl SendPingResponse {
    pub fn failed() -> Self {
        Self {
            success: false,
            response_message: None,
        }
    }
}
