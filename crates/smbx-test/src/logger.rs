//! Logger that keeps what it is told.

use std::error::Error;

use parking_lot::Mutex;
use smbx_core::StatusLogger;

/// Severity of a recorded entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// `information`.
    Information,
    /// `verbose`.
    Verbose,
    /// `error_message`, `error` and `error_with_addition`.
    Error,
}

/// One recorded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Severity.
    pub level: Level,
    /// Rendered message.
    pub message: String,
}

/// [`StatusLogger`] recording every call.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<Entry>>,
}

impl RecordingLogger {
    /// Creates an empty logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    #[must_use]
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.lock().clone()
    }

    /// Returns the recorded error messages.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.level == Level::Error)
            .map(|e| e.message.clone())
            .collect()
    }

    /// Number of recorded errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.level == Level::Error)
            .count()
    }

    /// Forgets everything recorded.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn push(&self, level: Level, message: String) {
        self.entries.lock().push(Entry { level, message });
    }
}

impl StatusLogger for RecordingLogger {
    fn information(&self, message: &str) {
        self.push(Level::Information, message.to_string());
    }

    fn verbose(&self, message: &str) {
        self.push(Level::Verbose, message.to_string());
    }

    fn error_message(&self, message: &str) {
        self.push(Level::Error, message.to_string());
    }

    fn error(&self, err: &dyn Error) {
        self.push(Level::Error, err.to_string());
    }

    fn error_with_addition(&self, err: &dyn Error, addition: &str) {
        self.push(Level::Error, format!("{addition}: {err}"));
    }
}
