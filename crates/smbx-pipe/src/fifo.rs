//! Named pipe (FIFO) handler.
//!
//! A FIFO reader sees end of stream whenever no writer holds the pipe open.
//! On Linux a keep-alive reader opens the FIFO read-write, so it also counts
//! as a writer and simply waits for the next frame. Elsewhere the reader polls
//! until a writer shows up or the deadline passes.

use std::io;
use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use nix::sys::stat::Mode;
use tokio::net::unix::pipe;

use crate::error::{PipeError, PipeResult};
use crate::frame;
use crate::handler::{PipeHandler, within};

/// Permission bits of FIFOs made by [`FifoPipe::create`].
pub const FIFO_MODE: u32 = 0o660;

/// Interval between reads while a non keep-alive reader has no writer.
const WRITER_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug)]
enum Stream {
    Reader(pipe::Receiver),
    Writer(pipe::Sender),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Read,
    Write,
}

/// One end of a named pipe.
#[derive(Debug)]
pub struct FifoPipe {
    path: PathBuf,
    name: String,
    direction: Direction,
    keep_alive: bool,
    max_frame_bytes: usize,
    stream: Option<Stream>,
}

impl FifoPipe {
    /// Creates a reading handle; keep-alive is on by default.
    #[must_use]
    pub fn reader(path: impl Into<PathBuf>, max_frame_bytes: usize) -> Self {
        Self::new(path.into(), Direction::Read, max_frame_bytes)
    }

    /// Creates a writing handle.
    #[must_use]
    pub fn writer(path: impl Into<PathBuf>, max_frame_bytes: usize) -> Self {
        Self::new(path.into(), Direction::Write, max_frame_bytes)
    }

    fn new(path: PathBuf, direction: Direction, max_frame_bytes: usize) -> Self {
        Self {
            name: path.display().to_string(),
            path,
            direction,
            keep_alive: direction == Direction::Read,
            max_frame_bytes,
            stream: None,
        }
    }

    /// Sets whether a reader holds the FIFO open read-write.
    ///
    /// Only has an effect on Linux.
    #[must_use]
    pub const fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Returns the pipe path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Makes a FIFO at `path` unless one is already there.
    ///
    /// # Errors
    /// Returns [`PipeError::Connection`] if something other than a FIFO
    /// occupies the path or the FIFO cannot be made.
    pub fn create(path: impl AsRef<Path>) -> PipeResult<()> {
        let path = path.as_ref();
        match std::fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_fifo() => return Ok(()),
            Ok(_) => {
                return Err(PipeError::connection(
                    path,
                    io::Error::new(io::ErrorKind::AlreadyExists, "path exists and is not a FIFO"),
                ));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(PipeError::connection(path, e)),
        }

        let mode = Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IWGRP;
        nix::unistd::mkfifo(path, mode)
            .map_err(|errno| PipeError::connection(path, io::Error::from(errno)))?;
        // mkfifo honours the umask
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(FIFO_MODE))
            .map_err(|e| PipeError::connection(path, e))?;
        tracing::info!(path = %path.display(), "created FIFO");
        Ok(())
    }

    fn effective_keep_alive(&self) -> bool {
        cfg!(target_os = "linux") && self.keep_alive
    }

    fn open_stream(&self) -> io::Result<Stream> {
        match self.direction {
            Direction::Read => {
                let mut options = pipe::OpenOptions::new();
                #[cfg(target_os = "linux")]
                options.read_write(self.keep_alive);
                options.open_receiver(&self.path).map(Stream::Reader)
            }
            Direction::Write => pipe::OpenOptions::new()
                .open_sender(&self.path)
                .map(Stream::Writer),
        }
    }

    async fn read_body(&mut self) -> PipeResult<Vec<u8>> {
        let keep_alive = self.effective_keep_alive();
        let max = self.max_frame_bytes;
        let Some(Stream::Reader(receiver)) = self.stream.as_mut() else {
            return Err(PipeError::closed(format!("{} is not open for reading", self.name)));
        };
        loop {
            match frame::read_frame(receiver, max).await {
                Err(PipeError::Closed(_)) if !keep_alive => {
                    tokio::time::sleep(WRITER_POLL_INTERVAL).await;
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl PipeHandler for FifoPipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    async fn open(&mut self) -> PipeResult<()> {
        if self.stream.is_some() {
            return Ok(());
        }
        let stream = self
            .open_stream()
            .map_err(|e| PipeError::connection(&self.path, e))?;
        tracing::debug!(pipe = %self.name, "opened");
        self.stream = Some(stream);
        Ok(())
    }

    async fn read_frame(&mut self, deadline: Option<Duration>) -> PipeResult<Vec<u8>> {
        let result = within(deadline, self.read_body()).await;
        if let Err(err) = &result {
            if err.poisons_stream() {
                tracing::debug!(pipe = %self.name, error = %err, "closing after read failure");
                self.stream = None;
            }
        }
        result
    }

    async fn write_frame(&mut self, body: &[u8]) -> PipeResult<()> {
        let Some(Stream::Writer(sender)) = self.stream.as_mut() else {
            return Err(PipeError::closed(format!("{} is not open for writing", self.name)));
        };
        let result = frame::write_frame(sender, body, self.max_frame_bytes).await;
        if result.is_err() {
            self.stream = None;
        }
        result
    }

    async fn close(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!(pipe = %self.name, "closed");
        }
    }
}
