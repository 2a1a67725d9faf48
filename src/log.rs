//! Structured logging for stress runs.
//!
//! Log levels:
//! - ERROR: Failed commands and the final failure count
//! - WARN: Unexpected conditions that are recoverable (missing tools)
//! - INFO: Run start/stop and staging step results
//! - DEBUG: Per-task dispatch and worker traces
//! - TRACE: Captured command output
//!
//! There is no process-wide logger. A [`Logger`] handle is created once in
//! `main` and passed to every component through the run context.
//! Debug mode can be enabled with `--debug` flag or `SMRT_STRESS_DEBUG=1` env var.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Log levels for filtering messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

/// Where formatted log lines end up.
#[derive(Debug, Clone)]
pub enum LogSink {
    Stderr,
    File(PathBuf),
    /// Keeps lines in memory; used by tests to assert on what was logged.
    Memory(Arc<Mutex<Vec<String>>>),
}

/// Cloneable logging handle shared by the generator, the workers and the
/// aggregator.
#[derive(Debug, Clone)]
pub struct Logger {
    level: LogLevel,
    sink: LogSink,
}

impl Logger {
    pub fn new(level: LogLevel, sink: LogSink) -> Self {
        Self { level, sink }
    }

    /// Logger writing to stderr, or to `log_file` when given.
    ///
    /// The level is DEBUG when `debug` is set or `SMRT_STRESS_DEBUG` is
    /// `1`/`true`, INFO otherwise.
    pub fn from_env(debug: bool, log_file: Option<PathBuf>) -> Self {
        let env_debug = std::env::var("SMRT_STRESS_DEBUG")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        let level = if debug || env_debug {
            LogLevel::Debug
        } else {
            LogLevel::Info
        };

        let sink = match log_file {
            Some(path) => LogSink::File(path),
            None => LogSink::Stderr,
        };
        Self::new(level, sink)
    }

    /// In-memory logger at TRACE level plus the buffer it writes to.
    pub fn memory() -> (Self, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        (
            Self::new(LogLevel::Trace, LogSink::Memory(Arc::clone(&lines))),
            lines,
        )
    }

    /// Logger that drops everything below ERROR and writes nowhere useful.
    /// Handy default for library callers that do not care.
    pub fn silent() -> Self {
        Self::new(LogLevel::Error, LogSink::Memory(Arc::new(Mutex::new(Vec::new()))))
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level
    }

    /// Log a message at the specified level.
    pub fn log_at(&self, level: LogLevel, msg: &str) {
        if !self.enabled(level) {
            return;
        }

        let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
        let line = format!("[{}] [{}] {}", timestamp, level.as_str(), msg);

        match &self.sink {
            LogSink::Stderr => {
                let _ = writeln!(std::io::stderr().lock(), "{}", line);
            }
            LogSink::File(path) => {
                if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                    let _ = writeln!(file, "{}", line);
                }
            }
            LogSink::Memory(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(line);
                }
            }
        }
    }

    pub fn error(&self, msg: &str) {
        self.log_at(LogLevel::Error, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.log_at(LogLevel::Warn, msg);
    }

    pub fn info(&self, msg: &str) {
        self.log_at(LogLevel::Info, msg);
    }

    pub fn debug(&self, msg: &str) {
        self.log_at(LogLevel::Debug, msg);
    }

    pub fn trace(&self, msg: &str) {
        self.log_at(LogLevel::Trace, msg);
    }
}

/// Log macro for INFO level.
#[macro_export]
macro_rules! slog {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
    };
}

/// Log macro for ERROR level.
#[macro_export]
macro_rules! slog_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error(&format!($($arg)*))
    };
}

/// Log macro for WARN level.
#[macro_export]
macro_rules! slog_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(&format!($($arg)*))
    };
}

/// Log macro for DEBUG level. The message is not formatted unless enabled.
#[macro_export]
macro_rules! slog_debug {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled($crate::log::LogLevel::Debug) {
            $logger.debug(&format!($($arg)*))
        }
    };
}

/// Log macro for TRACE level.
#[macro_export]
macro_rules! slog_trace {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled($crate::log::LogLevel::Trace) {
            $logger.trace(&format!($($arg)*))
        }
    };
}
