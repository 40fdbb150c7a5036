//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (port, timeouts)
//! - Check collector endpoints are absolute http(s) URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Settings → Result<(), Vec<ValidationError>>

use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::schema::Settings;

/// A single semantic problem with the settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("service_name must not be empty")]
    EmptyServiceName,

    #[error("port must be non-zero")]
    ZeroPort,

    #[error("request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("{field} is not a valid http(s) URL: {value}")]
    InvalidEndpoint { field: &'static str, value: String },

    #[error("log.dependency_level is not a valid filter directive: {0}")]
    InvalidDirective(String),
}

/// Check the settings, collecting every problem found.
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.service_name.trim().is_empty() {
        errors.push(ValidationError::EmptyServiceName);
    }
    if settings.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if settings.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let endpoints = [
        ("otlp_endpoint", settings.otlp_endpoint.as_deref()),
        ("log.otlp_endpoint", settings.log.otlp_endpoint.as_deref()),
    ];
    for (field, value) in endpoints {
        if let Some(value) = value {
            if !is_http_url(value) {
                errors.push(ValidationError::InvalidEndpoint {
                    field,
                    value: value.to_string(),
                });
            }
        }
    }

    if EnvFilter::try_new(&settings.log.dependency_level).is_err() {
        errors.push(ValidationError::InvalidDirective(
            settings.log.dependency_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}
