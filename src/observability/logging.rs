//! Structured logging.
//!
//! # Responsibilities
//! - Compose enrich → render → sink stages into a [`Pipeline`]
//! - Hand application code a cheap, cloneable [`Logger`] handle
//! - Build the pipeline from [`Settings`] exactly once ([`LoggerFactory`])
//!
//! # Design Decisions
//! - The logger is an explicit value passed to whoever logs; there is no global
//! - Trace context is passed per call via [`Entry::context`]
//! - A log call never fails and never waits on the network

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex, OnceLock};

use serde::Serialize;

use crate::config::{ConsoleFormat, Settings};
use crate::observability::context::RequestContext;
use crate::observability::enrich::{Enricher, RequestIdEnricher, TraceEnricher};
use crate::observability::format::{Formatter, JsonLineFormatter, PrettyFormatter};
use crate::observability::record::{to_json_or_debug, Level, LogRecord};
use crate::observability::sink::{ConsoleSink, OtlpSink, Sink};

/// Ordered enrichers followed by the sinks that receive each record.
pub struct Pipeline {
    enrichers: Vec<Box<dyn Enricher>>,
    sinks: Vec<Box<dyn Sink>>,
    floor: Option<Level>,
}

impl Pipeline {
    pub fn new(enrichers: Vec<Box<dyn Enricher>>, sinks: Vec<Box<dyn Sink>>) -> Self {
        let floor = sinks.iter().map(|s| s.min_level()).min();
        Self {
            enrichers,
            sinks,
            floor,
        }
    }

    /// Whether any sink would accept a record at `level`.
    pub fn enabled(&self, level: Level) -> bool {
        self.floor.is_some_and(|floor| level >= floor)
    }

    pub fn dispatch(&self, mut record: LogRecord, cx: Option<&RequestContext>) {
        if !self.enabled(record.level) {
            return;
        }
        for enricher in &self.enrichers {
            enricher.enrich(&mut record, cx);
        }
        for sink in &self.sinks {
            if record.level >= sink.min_level() {
                sink.write(&record);
            }
        }
    }

    fn flush(&self) {
        for sink in &self.sinks {
            sink.flush();
        }
    }

    fn shutdown(&self) {
        for sink in &self.sinks {
            sink.shutdown();
        }
    }
}

struct LoggerInner {
    name: String,
    pipeline: Pipeline,
}

/// Handle to a configured logging pipeline. Clones share the same pipeline.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.inner.name)
            .field("sinks", &self.inner.pipeline.sinks.len())
            .finish()
    }
}

impl Logger {
    pub fn new(name: impl Into<String>, pipeline: Pipeline) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                name: name.into(),
                pipeline,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// True when both handles point at the same pipeline.
    pub fn ptr_eq(a: &Logger, b: &Logger) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.inner.pipeline.enabled(level)
    }

    /// Start a record at `level`. Nothing is written until [`Entry::emit`].
    pub fn log(&self, level: Level, message: impl Into<String>) -> Entry<'_> {
        Entry {
            logger: self,
            record: LogRecord::new(level, self.inner.name.clone(), message),
            cx: None,
        }
    }

    pub fn debug(&self, message: impl Into<String>) -> Entry<'_> {
        self.log(Level::Debug, message)
    }

    pub fn info(&self, message: impl Into<String>) -> Entry<'_> {
        self.log(Level::Info, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> Entry<'_> {
        self.log(Level::Warning, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Entry<'_> {
        self.log(Level::Error, message)
    }

    pub fn critical(&self, message: impl Into<String>) -> Entry<'_> {
        self.log(Level::Critical, message)
    }

    /// Send a fully built record through the pipeline.
    pub fn dispatch(&self, record: LogRecord, cx: Option<&RequestContext>) {
        self.inner.pipeline.dispatch(record, cx);
    }

    pub fn flush(&self) {
        self.inner.pipeline.flush();
    }

    /// Flush and close every sink.
    pub fn shutdown(&self) {
        self.inner.pipeline.shutdown();
    }
}

/// A record under construction.
#[must_use = "a log entry is only written once `emit` is called"]
pub struct Entry<'a> {
    logger: &'a Logger,
    record: LogRecord,
    cx: Option<&'a RequestContext>,
}

impl<'a> Entry<'a> {
    /// Attach an extra field. Values serde cannot encode are kept as their `Debug` text.
    pub fn field<T>(mut self, key: &str, value: T) -> Self
    where
        T: Serialize + fmt::Debug,
    {
        if self.logger.enabled(self.record.level) {
            self.record.fields.insert(key.to_string(), to_json_or_debug(&value));
        }
        self
    }

    /// Attach an extra field rendered with `Display`.
    pub fn display(mut self, key: &str, value: impl fmt::Display) -> Self {
        if self.logger.enabled(self.record.level) {
            self.record
                .fields
                .insert(key.to_string(), value.to_string().into());
        }
        self
    }

    /// Attach an error and its source chain as `err`.
    pub fn err(self, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push_str(": ");
            chain.push_str(&cause.to_string());
            source = cause.source();
        }
        self.display("err", chain)
    }

    /// Correlate the record with a request's trace context.
    pub fn context(mut self, cx: &'a RequestContext) -> Self {
        self.cx = Some(cx);
        self
    }

    pub fn emit(self) {
        self.logger.dispatch(self.record, self.cx);
    }
}

/// Builds the service logger from settings, once.
///
/// `UNINITIALIZED → CONFIGURED` on the first [`get_logger`](Self::get_logger);
/// concurrent first calls construct a single pipeline.
pub struct LoggerFactory {
    settings: Arc<Settings>,
    console_writer: Mutex<Option<Box<dyn Write + Send>>>,
    logger: OnceLock<Logger>,
}

impl LoggerFactory {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            console_writer: Mutex::new(None),
            logger: OnceLock::new(),
        }
    }

    /// Send console output to `writer` instead of stdout.
    pub fn with_console_writer(self, writer: impl Write + Send + 'static) -> Self {
        *self
            .console_writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Box::new(writer));
        self
    }

    pub fn get_logger(&self) -> Logger {
        self.logger.get_or_init(|| self.build()).clone()
    }

    /// The logger, if it has been built.
    pub fn get(&self) -> Option<&Logger> {
        self.logger.get()
    }

    pub fn is_configured(&self) -> bool {
        self.logger.get().is_some()
    }

    fn build(&self) -> Logger {
        let settings = &self.settings;
        let log = &settings.log;

        let formatter: Box<dyn Formatter> = match log.console_format {
            ConsoleFormat::Json => Box::new(JsonLineFormatter),
            ConsoleFormat::Pretty => Box::new(PrettyFormatter::default()),
        };
        let writer = self
            .console_writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let console = match writer {
            Some(writer) => ConsoleSink::with_writer(formatter, log.console_level, writer),
            None => ConsoleSink::stdout(formatter, log.console_level),
        };

        let mut sinks: Vec<Box<dyn Sink>> = vec![Box::new(console)];
        let mut otlp_failure = None;
        if let Some(endpoint) = &log.otlp_endpoint {
            match OtlpSink::new(&settings.service_name, endpoint, log.otlp_level) {
                Ok(sink) => sinks.push(Box::new(sink)),
                Err(e) => otlp_failure = Some(e),
            }
        }

        let enrichers: Vec<Box<dyn Enricher>> =
            vec![Box::new(TraceEnricher), Box::new(RequestIdEnricher)];
        let logger = Logger::new(
            settings.service_name.clone(),
            Pipeline::new(enrichers, sinks),
        );

        match (&log.otlp_endpoint, otlp_failure) {
            (None, _) => logger
                .debug("OTLP endpoint not provided, skipping OTLP log export")
                .emit(),
            (Some(endpoint), Some(e)) => logger
                .warning("Failed to create OTLP log exporter, logging to console only")
                .field("otlp_endpoint", endpoint)
                .err(&e)
                .emit(),
            (Some(endpoint), None) => logger
                .info("OTLP log export enabled")
                .field("otlp_endpoint", endpoint)
                .field("otlp_level", log.otlp_level)
                .emit(),
        }

        logger
    }
}
