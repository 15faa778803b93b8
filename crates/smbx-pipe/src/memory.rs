//! In-memory pipe for tests and embedding.
//!
//! Both ends share one `tokio::io::duplex` stream. Closing only flips the
//! open flag: bytes already in the buffer stay there, unlike a FIFO whose
//! buffer is discarded once every handle is gone.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::DuplexStream;

use crate::error::{PipeError, PipeResult};
use crate::frame;
use crate::handler::{PipeHandler, within};

/// Handle over an in-memory byte stream.
#[derive(Debug)]
pub struct MemoryPipe {
    name: String,
    stream: Option<DuplexStream>,
    open: bool,
    max_frame_bytes: usize,
}

/// Creates a connected `(writer, reader)` pair.
///
/// `capacity` bounds the bytes buffered between the two ends; a writer blocks
/// once it is full, like a FIFO does.
#[must_use]
pub fn memory_pipe(name: &str, capacity: usize, max_frame_bytes: usize) -> (MemoryPipe, MemoryPipe) {
    let (writer, reader) = tokio::io::duplex(capacity);
    (
        MemoryPipe::with_stream(format!("{name} (writer)"), writer, max_frame_bytes),
        MemoryPipe::with_stream(format!("{name} (reader)"), reader, max_frame_bytes),
    )
}

impl MemoryPipe {
    fn with_stream(name: String, stream: DuplexStream, max_frame_bytes: usize) -> Self {
        Self {
            name,
            stream: Some(stream),
            open: false,
            max_frame_bytes,
        }
    }

    /// A handle whose `open` always fails, standing in for an absent daemon.
    #[must_use]
    pub fn unavailable(name: &str) -> Self {
        Self {
            name: name.to_string(),
            stream: None,
            open: false,
            max_frame_bytes: 0,
        }
    }

    /// Drops the underlying stream, so the other end sees end of stream.
    pub fn disconnect(&mut self) {
        self.stream = None;
        self.open = false;
    }

    fn stream_mut(&mut self) -> PipeResult<&mut DuplexStream> {
        match self.stream.as_mut() {
            Some(stream) if self.open => Ok(stream),
            _ => Err(PipeError::closed(format!("{} is not open", self.name))),
        }
    }
}

#[async_trait]
impl PipeHandler for MemoryPipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_open(&self) -> bool {
        self.open
    }

    async fn open(&mut self) -> PipeResult<()> {
        if self.stream.is_none() {
            return Err(PipeError::connection(
                &self.name,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no peer for in-memory pipe"),
            ));
        }
        self.open = true;
        Ok(())
    }

    async fn read_frame(&mut self, deadline: Option<Duration>) -> PipeResult<Vec<u8>> {
        let max = self.max_frame_bytes;
        let result = match self.stream_mut() {
            Ok(stream) => within(deadline, frame::read_frame(stream, max)).await,
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            if err.poisons_stream() {
                self.open = false;
            }
        }
        result
    }

    async fn write_frame(&mut self, body: &[u8]) -> PipeResult<()> {
        let max = self.max_frame_bytes;
        let stream = self.stream_mut()?;
        frame::write_frame(stream, body, max).await
    }

    async fn close(&mut self) {
        self.open = false;
    }
}
