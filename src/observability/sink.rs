//! Output stages.
//!
//! Every sink carries its own threshold, so the console can stay more
//! verbose than the remote collector. Writing never reports an error to the
//! caller: a failed write or export is dropped.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

use opentelemetry::logs::{AnyValue, LogRecord as _, Logger as _, LoggerProvider as _, Severity};
use opentelemetry::trace::{SpanId, TraceFlags, TraceId};
use opentelemetry_otlp::{LogExporter, WithExportConfig};
use opentelemetry_sdk::logs::{SdkLogger, SdkLoggerProvider};
use opentelemetry_sdk::Resource;
use serde_json::Value;

use crate::observability::format::Formatter;
use crate::observability::record::{Level, LogRecord};
use crate::observability::TelemetryError;

/// A stage that delivers formatted or structured records somewhere.
pub trait Sink: Send + Sync {
    /// Records below this level are skipped by this sink.
    fn min_level(&self) -> Level;

    fn write(&self, record: &LogRecord);

    /// Push out anything buffered.
    fn flush(&self) {}

    /// Flush and release resources. Called once at process shutdown.
    fn shutdown(&self) {
        self.flush();
    }
}

/// Writes formatted records, one per line, to stdout or a supplied writer.
pub struct ConsoleSink {
    formatter: Box<dyn Formatter>,
    writer: Mutex<Box<dyn Write + Send>>,
    min_level: Level,
}

impl ConsoleSink {
    pub fn stdout(formatter: Box<dyn Formatter>, min_level: Level) -> Self {
        Self::with_writer(formatter, min_level, Box::new(io::stdout()))
    }

    pub fn with_writer(
        formatter: Box<dyn Formatter>,
        min_level: Level,
        writer: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            formatter,
            writer: Mutex::new(writer),
            min_level,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        // A panic mid-write leaves the writer usable; keep logging.
        self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Sink for ConsoleSink {
    fn min_level(&self) -> Level {
        self.min_level
    }

    fn write(&self, record: &LogRecord) {
        let line = self.formatter.format(record);
        let mut writer = self.lock();
        let _ = writeln!(writer, "{line}");
    }

    fn flush(&self) {
        let _ = self.lock().flush();
    }
}

/// An in-memory writer whose contents can be read back, for capturing console output.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self.buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Ships records to an OTLP/HTTP collector through the SDK batch processor.
///
/// Export happens on the processor's background thread; `write` only queues.
pub struct OtlpSink {
    provider: SdkLoggerProvider,
    logger: SdkLogger,
    min_level: Level,
}

impl OtlpSink {
    /// Build an exporter posting to `{endpoint}/v1/logs`.
    pub fn new(service_name: &str, endpoint: &str, min_level: Level) -> Result<Self, TelemetryError> {
        let exporter = LogExporter::builder()
            .with_http()
            .with_endpoint(format!("{}/v1/logs", endpoint.trim_end_matches('/')))
            .build()
            .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

        let provider = SdkLoggerProvider::builder()
            .with_resource(
                Resource::builder()
                    .with_service_name(service_name.to_string())
                    .build(),
            )
            .with_batch_exporter(exporter)
            .build();

        Ok(Self::from_provider(provider, service_name, min_level))
    }

    /// Wrap an already configured provider.
    pub fn from_provider(provider: SdkLoggerProvider, service_name: &str, min_level: Level) -> Self {
        let logger = provider.logger(service_name.to_string());
        Self {
            provider,
            logger,
            min_level,
        }
    }
}

fn severity(level: Level) -> Severity {
    match level {
        Level::Debug => Severity::Debug,
        Level::Info => Severity::Info,
        Level::Warning => Severity::Warn,
        Level::Error => Severity::Error,
        Level::Critical => Severity::Fatal,
    }
}

fn to_any_value(value: &Value) -> AnyValue {
    match value {
        Value::Bool(b) => AnyValue::Boolean(*b),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => AnyValue::Int(i),
            (None, Some(f)) => AnyValue::Double(f),
            _ => AnyValue::from(n.to_string()),
        },
        Value::String(s) => AnyValue::from(s.clone()),
        other => AnyValue::from(other.to_string()),
    }
}

impl Sink for OtlpSink {
    fn min_level(&self) -> Level {
        self.min_level
    }

    fn write(&self, record: &LogRecord) {
        // Exporter diagnostics are not fed back into the exporter.
        if record.logger.starts_with("opentelemetry") {
            return;
        }

        let mut otel = self.logger.create_log_record();
        otel.set_timestamp(SystemTime::from(record.timestamp));
        otel.set_observed_timestamp(SystemTime::now());
        otel.set_severity_number(severity(record.level));
        otel.set_severity_text(record.level.as_str());
        otel.set_target(record.logger.clone());
        otel.set_body(AnyValue::from(record.message.clone()));

        for (key, value) in &record.fields {
            otel.add_attribute(key.clone(), to_any_value(value));
        }

        if let (Some(trace_id), Some(span_id)) = (&record.trace_id, &record.span_id) {
            if let (Ok(trace_id), Ok(span_id)) =
                (TraceId::from_hex(trace_id), SpanId::from_hex(span_id))
            {
                otel.set_trace_context(trace_id, span_id, Some(TraceFlags::SAMPLED));
            }
        }

        self.logger.emit(otel);
    }

    fn flush(&self) {
        let _ = self.provider.force_flush();
    }

    fn shutdown(&self) {
        let _ = self.provider.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::format::JsonLineFormatter;

    fn sink(min_level: Level) -> (ConsoleSink, MemoryWriter) {
        let writer = MemoryWriter::new();
        let sink =
            ConsoleSink::with_writer(Box::new(JsonLineFormatter), min_level, Box::new(writer.clone()));
        (sink, writer)
    }

    #[test]
    fn test_console_writes_one_line_per_record() {
        let (sink, writer) = sink(Level::Debug);
        sink.write(&LogRecord::new(Level::Info, "svc", "first"));
        sink.write(&LogRecord::new(Level::Debug, "svc", "second"));

        let contents = writer.contents();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let parsed: Value = serde_json::from_str(line).unwrap();
            assert!(parsed.get("message").is_some());
        }
    }

    #[test]
    fn test_threshold_exposed() {
        let (sink, _) = sink(Level::Warning);
        assert_eq!(sink.min_level(), Level::Warning);
    }

    #[test]
    fn test_any_value_conversion() {
        assert_eq!(to_any_value(&Value::from(42)), AnyValue::Int(42));
        assert_eq!(to_any_value(&Value::from(1.5)), AnyValue::Double(1.5));
        assert_eq!(to_any_value(&Value::from(true)), AnyValue::Boolean(true));
        assert_eq!(to_any_value(&Value::from("x")), AnyValue::from("x".to_string()));
        assert_eq!(
            to_any_value(&serde_json::json!({"a": 1})),
            AnyValue::from("{\"a\":1}".to_string())
        );
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(severity(Level::Warning), Severity::Warn);
        assert_eq!(severity(Level::Critical), Severity::Fatal);
    }

    #[test]
    fn test_otlp_sink_without_collector_never_fails() {
        // A provider with no exporter accepts and drops records.
        let sink = OtlpSink::from_provider(SdkLoggerProvider::builder().build(), "svc", Level::Info);
        let mut record = LogRecord::new(Level::Error, "svc", "boom");
        record.insert_field("status_code", &502);
        record.trace_id = Some("4bf92f3577b34da6a3ce929d0e0e4736".into());
        record.span_id = Some("00f067aa0ba902b7".into());
        sink.write(&record);
        sink.shutdown();
    }
}
