//! Configuration schema definitions.
//!
//! This module defines the complete settings structure for the service.
//! All types derive Serde traits for deserialization from a TOML override file;
//! environment variables are layered on top by the loader.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::observability::record::Level;

/// Root settings for the service.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Service name, used as the logger name and the OTel `service.name`.
    pub service_name: String,

    /// Interface to bind.
    pub host: String,

    /// Listening port.
    pub port: u16,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// OTLP/HTTP collector base URL for spans. Unset disables span export.
    pub otlp_endpoint: Option<String>,

    /// Logging pipeline settings.
    pub log: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_name: "microservice".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_secs: 30,
            otlp_endpoint: None,
            log: LogSettings::default(),
        }
    }
}

impl Settings {
    /// Address the HTTP listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging pipeline settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LogSettings {
    /// Threshold of the console sink.
    pub console_level: Level,

    /// Rendering used by the console sink.
    pub console_format: ConsoleFormat,

    /// Threshold of the OTLP log sink.
    pub otlp_level: Level,

    /// OTLP/HTTP collector base URL for logs. Unset keeps logging console-only.
    pub otlp_endpoint: Option<String>,

    /// `EnvFilter` directive applied to `tracing` events from dependencies.
    pub dependency_level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            console_level: Level::Debug,
            console_format: ConsoleFormat::Json,
            otlp_level: Level::Info,
            otlp_endpoint: None,
            dependency_level: "warn".to_string(),
        }
    }
}

/// Console rendering.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Colored, multi-line human-readable form.
    Pretty,
}

impl fmt::Display for ConsoleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleFormat::Json => f.write_str("json"),
            ConsoleFormat::Pretty => f.write_str("pretty"),
        }
    }
}

impl FromStr for ConsoleFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ConsoleFormat::Json),
            "pretty" | "console" => Ok(ConsoleFormat::Pretty),
            other => Err(format!("unknown console format '{other}'")),
        }
    }
}
