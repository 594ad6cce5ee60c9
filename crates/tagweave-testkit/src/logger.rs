//! Logger that records every diagnostic

use std::sync::Mutex;
use tagweave_core::{LogLevel, Logger};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Keeps diagnostics in memory for assertions
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    /// Messages logged at exactly `level`
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.message.clone())
            .collect()
    }

    /// Whether some message at `level` contains `needle`
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.lock()
            .iter()
            .any(|entry| entry.level == level && entry.message.contains(needle))
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogEntry>> {
        // A panicking test must not hide the log from the next assertion
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Logger for RecordingLogger {
    fn log(&self, message: &str, level: LogLevel) {
        self.lock().push(LogEntry {
            level,
            message: message.to_string(),
        });
    }
}
