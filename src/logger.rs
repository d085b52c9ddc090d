use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, LoggerConfig};
use crate::level::LogLevel;
use crate::record::assemble;
use crate::scope::Scope;
use crate::sink::{LogSink, SinkError, StdoutSink};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Handle that turns `(template, args)` calls into [`LogRecord`]s.
///
/// A logger is an identity (`context`), an immutable [`Scope`] and the two
/// collaborators it talks to: a [`Clock`] for `@timestamp` and a
/// [`LogSink`] for output. Cloning is cheap and [`Logger::scope_to`]
/// derives children without touching the parent.
///
/// ```
/// use scopelog::{Logger, MemorySink, FixedClock};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemorySink::new());
/// let log = Logger::builder("tests")
///     .clock(Arc::new(FixedClock::new("2024-05-04T08:39:33.905Z")))
///     .sink(sink.clone())
///     .build();
///
/// log.error("text-{v}-{l}", &[json!(1), json!(1)]).unwrap();
/// assert_eq!(sink.last().unwrap().message(), Some("text-1-1"));
/// ```
///
/// [`LogRecord`]: crate::record::LogRecord
#[derive(Clone)]
pub struct Logger {
    context: Arc<str>,
    scope: Scope,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn LogSink>,
}

impl Logger {
    /// Root logger with an empty scope, the system clock and stdout output.
    pub fn new(context: impl Into<String>) -> Self {
        Self::builder(context).build()
    }

    pub fn builder(context: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(context)
    }

    /// Root logger from a validated configuration, with default collaborators.
    pub fn from_config(config: LoggerConfig) -> Self {
        LoggerBuilder::from_config(config).build()
    }

    /// Validate a loosely typed configuration and build a root logger.
    ///
    /// A non-string `context` fails here, before any record is written.
    pub fn from_value(config: &Value) -> Result<Self, ConfigError> {
        LoggerConfig::from_value(config).map(Self::from_config)
    }

    /// Root logger configured from the `SCOPELOG_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_config(LoggerConfig::from_env())
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Derive a child logger.
    ///
    /// The child gets `context` as its identity (contexts do not nest) and
    /// a snapshot of this logger's scope with `overlay` applied on top.
    /// Clock and sink are shared. `self` is left as it was.
    pub fn scope_to(&self, context: impl Into<String>, overlay: &Value) -> Logger {
        let context: String = context.into();
        Logger {
            context: Arc::from(context),
            scope: self.scope.overlay(overlay),
            clock: Arc::clone(&self.clock),
            sink: Arc::clone(&self.sink),
        }
    }

    /// Assemble one record and hand it to the sink before returning.
    pub fn log(&self, level: LogLevel, template: &str, args: &[Value]) -> Result<(), SinkError> {
        self.emit(level.as_str(), Some(template), args)
    }

    /// Like [`Logger::log`] for a raw numeric level; values outside `1..=5`
    /// are written as `"info"`.
    pub fn log_raw(&self, level: i64, template: &str, args: &[Value]) -> Result<(), SinkError> {
        self.emit(LogLevel::label_for_raw(level), Some(template), args)
    }

    pub fn error(&self, template: &str, args: &[Value]) -> Result<(), SinkError> {
        self.log(LogLevel::Error, template, args)
    }

    pub fn warn(&self, template: &str, args: &[Value]) -> Result<(), SinkError> {
        self.log(LogLevel::Warn, template, args)
    }

    pub fn info(&self, template: &str, args: &[Value]) -> Result<(), SinkError> {
        self.log(LogLevel::Info, template, args)
    }

    pub fn debug(&self, template: &str, args: &[Value]) -> Result<(), SinkError> {
        self.log(LogLevel::Debug, template, args)
    }

    pub fn trace(&self, template: &str, args: &[Value]) -> Result<(), SinkError> {
        self.log(LogLevel::Trace, template, args)
    }

    pub fn flush(&self) -> Result<(), SinkError> {
        self.sink.flush()
    }

    fn emit(&self, level: &str, template: Option<&str>, args: &[Value]) -> Result<(), SinkError> {
        let now = self.clock.now();
        let record = assemble(level, &self.context, &self.scope, &now, template, args);
        self.sink.write(&record)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("context", &self.context)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Builder for root loggers; unset collaborators fall back to
/// [`SystemClock`] and [`StdoutSink`].
pub struct LoggerBuilder {
    context: String,
    scope: Scope,
    clock: Option<Arc<dyn Clock>>,
    sink: Option<Arc<dyn LogSink>>,
}

impl LoggerBuilder {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            scope: Scope::empty(),
            clock: None,
            sink: None,
        }
    }

    pub fn from_config(config: LoggerConfig) -> Self {
        let builder = Self::new(config.context);
        match config.scope {
            Some(scope) => builder.scope(&scope),
            None => builder,
        }
    }

    /// Initial scope, snapshotted now.
    pub fn scope(mut self, scope: &Value) -> Self {
        self.scope = Scope::from_value(scope);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            context: Arc::from(self.context),
            scope: self.scope,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            sink: self.sink.unwrap_or_else(|| Arc::new(StdoutSink)),
        }
    }
}
