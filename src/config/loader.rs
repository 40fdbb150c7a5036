//! Settings loading from an optional TOML file and the environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::Settings;
use crate::config::validation::{validate_settings, ValidationError};

/// Error type for settings loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {reason}")]
    Env { key: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load settings from the process environment, optionally layered over a TOML file.
///
/// A `.env` file in the working directory is read first; variables already
/// present in the environment take precedence over it.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let _ = dotenvy::dotenv();
    load_settings_from(path, |key| std::env::var(key).ok())
}

/// Load settings with an explicit variable lookup.
pub fn load_settings_from<F>(path: Option<&Path>, lookup: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&content)?
        }
        None => Settings::default(),
    };

    apply_env(&mut settings, |key| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })?;

    validate_settings(&settings).map_err(ConfigError::Validation)?;

    Ok(settings)
}

fn apply_env<F>(settings: &mut Settings, var: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = var("SERVICE_NAME") {
        settings.service_name = v;
    }
    if let Some(v) = var("HOST") {
        settings.host = v;
    }
    if let Some(v) = var("PORT") {
        settings.port = parse_var("PORT", &v)?;
    }
    if let Some(v) = var("REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = parse_var("REQUEST_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = var("OTLP_ENDPOINT") {
        settings.otlp_endpoint = Some(v);
    }
    if let Some(v) = var("LOG_CONSOLE_LEVEL") {
        settings.log.console_level = parse_var("LOG_CONSOLE_LEVEL", &v)?;
    }
    if let Some(v) = var("LOG_CONSOLE_FORMAT") {
        settings.log.console_format = parse_var("LOG_CONSOLE_FORMAT", &v)?;
    }
    if let Some(v) = var("LOG_OTLP_LEVEL") {
        settings.log.otlp_level = parse_var("LOG_OTLP_LEVEL", &v)?;
    }
    if let Some(v) = var("LOG_OTLP_ENDPOINT") {
        settings.log.otlp_endpoint = Some(v);
    }
    if let Some(v) = var("LOG_DEPENDENCY_LEVEL") {
        settings.log.dependency_level = v;
    }
    Ok(())
}

fn parse_var<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Env {
        key,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ConsoleFormat;
    use crate::observability::record::Level;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_no_sources_yields_defaults() {
        let settings = load_settings_from(None, env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_env_overrides() {
        let settings = load_settings_from(
            None,
            env(&[
                ("SERVICE_NAME", "api_gateway"),
                ("PORT", "8000"),
                ("LOG_CONSOLE_LEVEL", "info"),
                ("LOG_OTLP_LEVEL", "ERROR"),
                ("LOG_OTLP_ENDPOINT", "http://collector:4318"),
                ("LOG_CONSOLE_FORMAT", "pretty"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.service_name, "api_gateway");
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.log.console_level, Level::Info);
        assert_eq!(settings.log.otlp_level, Level::Error);
        assert_eq!(
            settings.log.otlp_endpoint.as_deref(),
            Some("http://collector:4318")
        );
        assert_eq!(settings.log.console_format, ConsoleFormat::Pretty);
    }

    #[test]
    fn test_empty_endpoint_counts_as_unset() {
        let settings =
            load_settings_from(None, env(&[("LOG_OTLP_ENDPOINT", "  "), ("OTLP_ENDPOINT", "")]))
                .unwrap();
        assert!(settings.log.otlp_endpoint.is_none());
        assert!(settings.otlp_endpoint.is_none());
    }

    #[test]
    fn test_bad_port_is_reported() {
        let err = load_settings_from(None, env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: "PORT", .. }));
    }

    #[test]
    fn test_bad_level_is_reported() {
        let err = load_settings_from(None, env(&[("LOG_CONSOLE_LEVEL", "chatty")])).unwrap_err();
        assert!(err.to_string().contains("LOG_CONSOLE_LEVEL"));
    }

    #[test]
    fn test_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "service_name = \"from-file\"\nport = 4000\n[log]\notlp_level = \"warning\""
        )
        .unwrap();

        let settings = load_settings_from(Some(file.path()), env(&[("PORT", "5000")])).unwrap();
        assert_eq!(settings.service_name, "from-file");
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.log.otlp_level, Level::Warning);
    }

    #[test]
    fn test_missing_file() {
        let err = load_settings_from(Some(Path::new("/nonexistent/settings.toml")), env(&[]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_validation_runs_after_env() {
        let err = load_settings_from(None, env(&[("OTLP_ENDPOINT", "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
