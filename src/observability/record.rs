//! Log record model.
//!
//! A [`LogRecord`] is built by a single log call, passed through the
//! pipeline stages and dropped; nothing is persisted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Severity of a log record, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level '{0}'")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" | "TRACE" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARNING" | "WARN" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            "CRITICAL" | "FATAL" => Ok(Level::Critical),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = ParseLevelError;

    fn try_from(value: String) -> Result<Self, ParseLevelError> {
        value.parse()
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.as_str().to_string()
    }
}

impl From<&tracing::Level> for Level {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warning,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// One log call's worth of data.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    /// Logger name: the service name, or the event target for bridged records.
    pub logger: String,
    pub message: String,
    /// Caller-supplied extra fields.
    pub fields: Map<String, Value>,
    /// 32 lowercase hex chars; set only while a span is active.
    pub trace_id: Option<String>,
    /// 16 lowercase hex chars; set only while a span is active.
    pub span_id: Option<String>,
}

impl LogRecord {
    pub fn new(level: Level, logger: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            logger: logger.into(),
            message: message.into(),
            fields: Map::new(),
            trace_id: None,
            span_id: None,
        }
    }

    /// Set an extra field, coercing values serde cannot represent to their `Debug` text.
    pub fn insert_field<T>(&mut self, key: impl Into<String>, value: &T)
    where
        T: Serialize + fmt::Debug + ?Sized,
    {
        self.fields.insert(key.into(), to_json_or_debug(value));
    }
}

/// Serialize `value` to JSON, falling back to its `Debug` text.
pub fn to_json_or_debug<T>(value: &T) -> Value
where
    T: Serialize + fmt::Debug + ?Sized,
{
    serde_json::to_value(value).unwrap_or_else(|_| Value::String(format!("{value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_level_order() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warning);
        assert!(Level::Warning < Level::Error);
        assert!(Level::Error < Level::Critical);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("debug".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!(" Warn ".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!("CRITICAL".parse::<Level>().unwrap(), Level::Critical);
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_level_serde_uses_names() {
        let level: Level = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(level, Level::Warning);
        assert_eq!(serde_json::to_string(&Level::Critical).unwrap(), "\"CRITICAL\"");
        assert!(serde_json::from_str::<Level>("\"loud\"").is_err());
    }

    #[test]
    fn test_level_from_tracing() {
        assert_eq!(Level::from(&tracing::Level::TRACE), Level::Debug);
        assert_eq!(Level::from(&tracing::Level::WARN), Level::Warning);
        assert_eq!(Level::from(&tracing::Level::ERROR), Level::Error);
    }

    #[test]
    fn test_insert_serializable_field() {
        let mut record = LogRecord::new(Level::Info, "svc", "msg");
        record.insert_field("port", &8000);
        record.insert_field("tags", &vec!["a", "b"]);
        record.insert_field("missing", &Option::<String>::None);

        assert_eq!(record.fields["port"], Value::from(8000));
        assert_eq!(record.fields["tags"], serde_json::json!(["a", "b"]));
        assert_eq!(record.fields["missing"], Value::Null);
    }

    #[test]
    fn test_unserializable_field_becomes_string() {
        // JSON object keys must be strings, so a tuple-keyed map fails to serialize.
        let mut odd: HashMap<(u8, u8), u8> = HashMap::new();
        odd.insert((1, 2), 3);

        let mut record = LogRecord::new(Level::Info, "svc", "msg");
        record.insert_field("odd", &odd);

        assert_eq!(record.fields["odd"], Value::String(format!("{odd:?}")));
    }
}
