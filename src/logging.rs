//! Leveled logging for the configuration pipeline.
//!
//! Every message goes to `tracing`. A host runtime that has its own logger
//! (a plugin console, for instance) can attach a [`LogSink`] to receive the
//! same messages as plain text.

use std::fmt;
use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};
use tracing::Level;

/// Message severity, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
}

impl LogLevel {
    fn from_u8(val: u8) -> Self {
        match val {
            0 => LogLevel::Debug,
            1 => LogLevel::Info,
            2 => LogLevel::Warning,
            _ => LogLevel::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Convert a [`LogLevel`] to the matching tracing level.
pub fn log_level_to_tracing(level: LogLevel) -> Level {
    match level {
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warning => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

/// Atomic minimum level, shareable between loggers.
pub struct LogLevelFilter(AtomicU8);

impl LogLevelFilter {
    /// Create a filter with the given minimum level.
    pub fn new(level: LogLevel) -> Self {
        Self(AtomicU8::new(level as u8))
    }

    /// Current minimum level.
    pub fn get(&self) -> LogLevel {
        LogLevel::from_u8(self.0.load(Ordering::Relaxed))
    }

    /// Set the minimum level.
    pub fn set(&self, level: LogLevel) {
        self.0.store(level as u8, Ordering::Relaxed);
    }

    /// Check if a message at `level` passes the filter.
    pub fn should_log(&self, level: LogLevel) -> bool {
        level as u8 >= self.0.load(Ordering::Relaxed)
    }
}

impl Default for LogLevelFilter {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

/// Host-side receiver of log messages.
pub trait LogSink: Send + Sync {
    /// Receive one message that passed the logger's filter.
    fn log(&self, level: LogLevel, logger: Option<&str>, message: &str);
}

/// Logger that writes to tracing and, if attached, to a host sink.
#[derive(Clone)]
pub struct Logger {
    sink: Option<Arc<dyn LogSink>>,
    level_filter: Arc<LogLevelFilter>,
    name: Option<String>,
}

impl Logger {
    /// Create an unnamed logger that writes to tracing only.
    pub fn new() -> Self {
        Self {
            sink: None,
            level_filter: Arc::new(LogLevelFilter::default()),
            name: None,
        }
    }

    /// Forward messages to a host sink as well as tracing.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Set the level filter.
    pub fn with_level_filter(mut self, filter: Arc<LogLevelFilter>) -> Self {
        self.level_filter = filter;
        self
    }

    /// Set the logger name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Logger name, if one was set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Log a message to tracing and the sink, if any.
    pub fn log(&self, level: LogLevel, message: &str) {
        if !self.level_filter.should_log(level) {
            return;
        }

        let name = self.name.as_deref().unwrap_or("");
        match log_level_to_tracing(level) {
            Level::ERROR => tracing::error!(logger = name, "{}", message),
            Level::WARN => tracing::warn!(logger = name, "{}", message),
            Level::INFO => tracing::info!(logger = name, "{}", message),
            _ => tracing::debug!(logger = name, "{}", message),
        }

        if let Some(ref sink) = self.sink {
            sink.log(level, self.name.as_deref(), message);
        }
    }

    /// Log a debug message.
    pub fn debug(&self, msg: &str) {
        self.log(LogLevel::Debug, msg);
    }

    /// Log an info message.
    pub fn info(&self, msg: &str) {
        self.log(LogLevel::Info, msg);
    }

    /// Log a warning message.
    pub fn warning(&self, msg: &str) {
        self.log(LogLevel::Warning, msg);
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        self.log(LogLevel::Error, msg);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level_filter.get())
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}
