//! Diagnostic sink used by the engine

use std::fmt;

/// Severity of an engine diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// Fire-and-forget diagnostic sink.
///
/// The engine never inspects what a logger does with a message.
pub trait Logger: Send + Sync {
    fn log(&self, message: &str, level: LogLevel);
}

/// Default logger forwarding to `tracing` under the `tagweave` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &str, level: LogLevel) {
        match level {
            LogLevel::Debug => tracing::debug!(target: "tagweave", "{}", message),
            LogLevel::Info => tracing::info!(target: "tagweave", "{}", message),
            LogLevel::Warning => tracing::warn!(target: "tagweave", "{}", message),
            LogLevel::Error => tracing::error!(target: "tagweave", "{}", message),
        }
    }
}
