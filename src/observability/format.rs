//! Record rendering stages.
//!
//! # Formats
//! - [`JsonLineFormatter`]: one JSON object per line, for shipping and aggregation
//! - [`PrettyFormatter`]: colored, multi-line, for a developer's terminal
//!
//! # Key Policy
//! `timestamp`, `level`, `logger` and `message` are reserved. An extra field
//! with one of those names is dropped in favor of the reserved value.
//! `trace_id` / `span_id` are written only when the record carries them.

use chrono::SecondsFormat;
use serde_json::{Map, Value};

use crate::observability::record::{Level, LogRecord};

/// Keys the formatter always owns.
pub const RESERVED_KEYS: [&str; 4] = ["timestamp", "level", "logger", "message"];

/// A stage that renders a record to text.
pub trait Formatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> String;
}

/// Renders each record as a single-line JSON document.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLineFormatter;

impl JsonLineFormatter {
    /// Build the JSON object for `record` without serializing it.
    pub fn to_value(record: &LogRecord) -> Value {
        let mut payload = Map::with_capacity(record.fields.len() + 6);
        payload.insert(
            "timestamp".into(),
            record
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Millis, true)
                .into(),
        );
        payload.insert("level".into(), record.level.as_str().into());
        payload.insert("logger".into(), record.logger.clone().into());
        payload.insert("message".into(), record.message.clone().into());

        if let Some(trace_id) = &record.trace_id {
            payload.insert("trace_id".into(), trace_id.clone().into());
        }
        if let Some(span_id) = &record.span_id {
            payload.insert("span_id".into(), span_id.clone().into());
        }

        for (key, value) in &record.fields {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            payload.entry(key.clone()).or_insert_with(|| value.clone());
        }

        Value::Object(payload)
    }
}

impl Formatter for JsonLineFormatter {
    fn format(&self, record: &LogRecord) -> String {
        let payload = Self::to_value(record);
        serde_json::to_string(&payload).unwrap_or_else(|e| {
            // Only reachable through a broken Serialize impl upstream; keep the line parseable.
            serde_json::json!({
                "timestamp": record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                "level": record.level.as_str(),
                "logger": record.logger,
                "message": record.message,
                "err": e.to_string(),
            })
            .to_string()
        })
    }
}

const CYAN: &str = "\x1b[36m";
const PURPLE: &str = "\x1b[35m";
const THIN_WHITE: &str = "\x1b[37m";
const RESET: &str = "\x1b[0m";

fn level_color(level: Level) -> &'static str {
    match level {
        Level::Debug => "\x1b[36m",
        Level::Info => "\x1b[32m",
        Level::Warning => "\x1b[33m",
        Level::Error => "\x1b[31m",
        Level::Critical => "\x1b[31;47m",
    }
}

/// Human-readable console rendering.
///
/// Main line: `timestamp │ LEVEL │ logger │ message`, then one
/// `├─ "key": value` line per extra field (trace ids included).
#[derive(Debug, Clone, Copy)]
pub struct PrettyFormatter {
    ansi: bool,
}

impl PrettyFormatter {
    pub fn new(ansi: bool) -> Self {
        Self { ansi }
    }

    fn paint(&self, color: &'static str) -> &'static str {
        if self.ansi {
            color
        } else {
            ""
        }
    }
}

impl Default for PrettyFormatter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Formatter for PrettyFormatter {
    fn format(&self, record: &LogRecord) -> String {
        let color = self.paint(level_color(record.level));
        let cyan = self.paint(CYAN);
        let purple = self.paint(PURPLE);
        let dim = self.paint(THIN_WHITE);
        let reset = self.paint(RESET);

        let timestamp = record.timestamp.format("%Y-%m-%d %H:%M:%S");
        let mut lines = vec![format!(
            "{cyan}{timestamp} {color}│{reset} {color}{:<8}{reset} {color}│{reset} \
             {purple}{:<15}{color}│{reset} {}{reset}",
            record.level.as_str(),
            record.logger,
            record.message,
        )];

        let mut extras: Vec<(&str, String)> = Vec::new();
        if let Some(trace_id) = &record.trace_id {
            extras.push(("trace_id", trace_id.clone()));
        }
        if let Some(span_id) = &record.span_id {
            extras.push(("span_id", span_id.clone()));
        }
        for (key, value) in &record.fields {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            extras.push((key.as_str(), rendered));
        }

        let last = extras.len().saturating_sub(1);
        for (i, (key, value)) in extras.iter().enumerate() {
            let connector = if i == last { "└─" } else { "├─" };
            lines.push(format!("    {dim}{connector} \"{key}\": {value}{reset}"));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> LogRecord {
        let mut record = LogRecord::new(Level::Info, "microservice", "Starting application");
        record.insert_field("port", &3000);
        record
    }

    #[test]
    fn test_json_required_keys() {
        let line = JsonLineFormatter.format(&record());
        let parsed: Value = serde_json::from_str(&line).unwrap();

        assert_eq!(parsed["level"], "INFO");
        assert_eq!(parsed["message"], "Starting application");
        assert_eq!(parsed["logger"], "microservice");
        assert_eq!(parsed["port"], 3000);
        let ts = parsed["timestamp"].as_str().unwrap();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn test_json_key_order() {
        let line = JsonLineFormatter.format(&record());
        assert!(line.starts_with("{\"timestamp\":"));
        let level_at = line.find("\"level\"").unwrap();
        let message_at = line.find("\"message\"").unwrap();
        let port_at = line.find("\"port\"").unwrap();
        assert!(level_at < message_at && message_at < port_at);
    }

    #[test]
    fn test_json_reserved_keys_win() {
        let mut record = record();
        record.insert_field("message", "spoofed");
        record.insert_field("level", "NOPE");
        record.insert_field("timestamp", &0);

        let parsed: Value = serde_json::from_str(&JsonLineFormatter.format(&record)).unwrap();
        assert_eq!(parsed["message"], "Starting application");
        assert_eq!(parsed["level"], "INFO");
        assert!(parsed["timestamp"].is_string());
    }

    #[test]
    fn test_json_trace_ids_only_when_present() {
        let parsed: Value = serde_json::from_str(&JsonLineFormatter.format(&record())).unwrap();
        assert!(parsed.get("trace_id").is_none());
        assert!(parsed.get("span_id").is_none());

        let mut record = record();
        record.trace_id = Some("4bf92f3577b34da6a3ce929d0e0e4736".into());
        record.span_id = Some("00f067aa0ba902b7".into());
        let parsed: Value = serde_json::from_str(&JsonLineFormatter.format(&record)).unwrap();
        assert_eq!(parsed["trace_id"], "4bf92f3577b34da6a3ce929d0e0e4736");
        assert_eq!(parsed["span_id"], "00f067aa0ba902b7");
    }

    #[test]
    fn test_json_single_line() {
        let mut record = LogRecord::new(Level::Error, "svc", "line one\nline two");
        record.insert_field("body", "a\r\nb");
        let line = JsonLineFormatter.format(&record);
        assert!(!line.contains('\n'));
        assert!(!line.contains('\r'));

        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["message"], "line one\nline two");
    }

    #[test]
    fn test_pretty_layout() {
        let mut record = record();
        record.insert_field("user_agent", "curl/8.0");
        record.trace_id = Some("4bf92f3577b34da6a3ce929d0e0e4736".into());

        let out = PrettyFormatter::new(false).format(&record);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].contains("Starting application"));
        assert!(lines[1].contains("├─ \"trace_id\": 4bf92f3577b34da6a3ce929d0e0e4736"));
        assert!(lines[2].contains("├─ \"port\": 3000"));
        assert!(lines[3].contains("└─ \"user_agent\": curl/8.0"));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_pretty_colors() {
        let out = PrettyFormatter::default().format(&LogRecord::new(Level::Warning, "svc", "careful"));
        assert!(out.contains("\x1b[33m"));
        assert!(out.ends_with(RESET));
    }
}
