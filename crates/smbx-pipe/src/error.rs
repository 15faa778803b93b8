//! Transport error types.

use std::path::PathBuf;
use std::time::Duration;

/// Result type alias for pipe operations.
pub type PipeResult<T> = std::result::Result<T, PipeError>;

/// Errors raised by the pipe transport.
#[derive(Debug, thiserror::Error)]
pub enum PipeError {
    /// The pipe path could not be opened; usually the daemon is not running.
    #[error("cannot open pipe {path}: {source}")]
    Connection {
        /// Pipe path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// No matching response within the deadline.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// Frame or message did not match the protocol.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The daemon answered, but its status command failed.
    #[error("upstream command failed: {0}")]
    Upstream(String),

    /// Frame body exceeds the configured limit.
    #[error("frame of {size} bytes exceeds limit of {max} bytes")]
    FrameTooLarge {
        /// Body size.
        size: usize,
        /// Configured limit.
        max: usize,
    },

    /// The handle is closed or the peer went away.
    #[error("pipe closed: {0}")]
    Closed(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipeError {
    /// Creates a connection error.
    #[must_use]
    pub fn connection(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Connection {
            path: path.into(),
            source,
        }
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Creates an upstream command failure.
    #[must_use]
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Creates a closed error.
    #[must_use]
    pub fn closed(msg: impl Into<String>) -> Self {
        Self::Closed(msg.into())
    }

    /// Returns true if the next exchange may succeed without intervention.
    ///
    /// Connection errors need the daemon to come up, so they are not counted
    /// here even though a scrape loop will retry them anyway.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_)
                | Self::Protocol(_)
                | Self::Upstream(_)
                | Self::Closed(_)
                | Self::FrameTooLarge { .. }
        )
    }

    /// Returns true if the handle's framing state can no longer be trusted.
    #[must_use]
    pub const fn poisons_stream(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_)
                | Self::Protocol(_)
                | Self::FrameTooLarge { .. }
                | Self::Closed(_)
                | Self::Io(_)
        )
    }
}
