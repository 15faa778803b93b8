//! Status daemon error types.

use std::time::Duration;

use smbx_core::SmbxError;
use smbx_pipe::PipeError;

/// Result type alias for daemon operations.
pub type Result<T> = std::result::Result<T, StatusdError>;

/// Errors raised by the status daemon.
#[derive(Debug, thiserror::Error)]
pub enum StatusdError {
    /// A command ran but reported failure.
    #[error("command `{command}` failed: {message}")]
    Command {
        /// Command line as run.
        command: String,
        /// Exit status and stderr.
        message: String,
    },

    /// A command did not finish in time and was killed.
    #[error("command `{command}` timed out after {timeout:?}")]
    CommandTimeout {
        /// Command line as run.
        command: String,
        /// Configured limit.
        timeout: Duration,
    },

    /// A command could not be started.
    #[error("cannot start `{command}`: {source}")]
    Spawn {
        /// Command line as run.
        command: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Startup work, such as creating the pipes, failed.
    #[error("setup failed: {0}")]
    Setup(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Pipe transport error.
    #[error(transparent)]
    Pipe(#[from] PipeError),
}

impl StatusdError {
    /// Creates a command failure.
    #[must_use]
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates a setup error.
    #[must_use]
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true if the next request may succeed.
    ///
    /// Command failures are answered with a failed response and the daemon
    /// keeps serving; setup and configuration errors stop it.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Command { .. } | Self::CommandTimeout { .. } | Self::Spawn { .. } => true,
            Self::Pipe(err) => err.is_recoverable(),
            Self::Setup(_) | Self::Config(_) => false,
        }
    }
}

impl From<SmbxError> for StatusdError {
    fn from(err: SmbxError) -> Self {
        Self::Config(err.to_string())
    }
}
