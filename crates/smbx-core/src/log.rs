//! Logger capability used by the table parser and the collector.
//!
//! The parser reports skipped lines through this trait instead of calling
//! `tracing` directly, so tests can count diagnostics and silence them.

use std::error::Error;

/// Sink for informational, verbose and error diagnostics.
pub trait StatusLogger: Send + Sync {
    /// Writes an informational message.
    fn information(&self, message: &str);

    /// Writes a message that is only of interest when running verbose.
    fn verbose(&self, message: &str);

    /// Writes an error given as plain text.
    fn error_message(&self, message: &str);

    /// Writes an error value.
    fn error(&self, err: &dyn Error);

    /// Writes an error value with the context it occurred in.
    fn error_with_addition(&self, err: &dyn Error, addition: &str);
}

/// Console sink forwarding to `tracing`.
///
/// Verbose messages are emitted at `debug`, so the subscriber's filter decides
/// whether they reach the console.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl StatusLogger for TracingLogger {
    fn information(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn verbose(&self, message: &str) {
        tracing::debug!("{message}");
    }

    fn error_message(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn error(&self, err: &dyn Error) {
        tracing::error!(error = %err);
    }

    fn error_with_addition(&self, err: &dyn Error, addition: &str) {
        tracing::error!(error = %err, "{addition}");
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl StatusLogger for NullLogger {
    fn information(&self, _message: &str) {}

    fn verbose(&self, _message: &str) {}

    fn error_message(&self, _message: &str) {}

    fn error(&self, _err: &dyn Error) {}

    fn error_with_addition(&self, _err: &dyn Error, _addition: &str) {}
}
