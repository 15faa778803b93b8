//! Pipe handler capability.
//!
//! A handler is one direction of the pipe pair. The client and server only
//! talk to this trait, so tests swap the FIFO for an in-memory stream.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{PipeError, PipeResult};

/// One end of a one-directional frame stream.
///
/// After a timeout or a framing error the handler closes itself: its stream
/// position can no longer be trusted, so the next caller has to `open` again.
#[async_trait]
pub trait PipeHandler: Send {
    /// Name used in logs, usually the pipe path.
    fn name(&self) -> &str;

    /// Returns true if the handle is open.
    fn is_open(&self) -> bool;

    /// Opens the handle; a no-op when already open.
    ///
    /// # Errors
    /// Returns [`PipeError::Connection`] if the pipe cannot be opened.
    async fn open(&mut self) -> PipeResult<()>;

    /// Reads one frame body, waiting at most `deadline` when given.
    ///
    /// # Errors
    /// Returns [`PipeError::Timeout`] when the deadline passes, or the codec
    /// error for a bad frame.
    async fn read_frame(&mut self, deadline: Option<Duration>) -> PipeResult<Vec<u8>>;

    /// Writes one complete frame.
    ///
    /// # Errors
    /// Returns an error if the handle is closed or the write fails.
    async fn write_frame(&mut self, body: &[u8]) -> PipeResult<()>;

    /// Closes the handle.
    async fn close(&mut self);
}

/// Awaits `read`, bounded by `deadline` when given.
pub(crate) async fn within<F>(deadline: Option<Duration>, read: F) -> PipeResult<Vec<u8>>
where
    F: Future<Output = PipeResult<Vec<u8>>>,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, read)
            .await
            .map_err(|_| PipeError::Timeout(limit))?,
        None => read.await,
    }
}
