//! Exporter error types.

use smbx_core::SmbxError;
use smbx_pipe::PipeError;

/// Result type alias for exporter operations.
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Errors raised by the exporter.
#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport error while fetching a snapshot.
    #[error(transparent)]
    Pipe(#[from] PipeError),

    /// HTTP server error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Metric descriptor or encoding error.
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl ExporterError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an HTTP error.
    #[must_use]
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Returns true if only the current scrape is affected.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Pipe(_) | Self::Metrics(_) => true,
            Self::Config(_) | Self::Http(_) => false,
        }
    }
}

impl From<SmbxError> for ExporterError {
    fn from(err: SmbxError) -> Self {
        Self::Config(err.to_string())
    }
}
