// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # smbx-pipe
//!
//! Correlated request/response transport over two one-directional pipes.
//!
//! The exporter holds a [`StatusClient`]; the privileged daemon runs a
//! [`PipeServer`]. Both see the pipes only through the [`PipeHandler`]
//! capability, implemented by [`FifoPipe`] for named pipes and by
//! [`MemoryPipe`] for tests.
//!
//! Frames are length-prefixed (see [`frame`]), and every response echoes the
//! id of the request it answers, so a late answer to an abandoned exchange is
//! recognized and skipped instead of being read as the current one.
//!
//! ## Example
//!
//! ```rust,ignore
//! use smbx_pipe::{Dataset, FifoPipe, StatusClient};
//! use std::time::Duration;
//!
//! let requests = FifoPipe::writer("/run/samba_exporter.request.pipe", 1 << 24);
//! let responses = FifoPipe::reader("/run/samba_exporter.response.pipe", 1 << 24);
//! let mut client = StatusClient::new(requests, responses, Duration::from_secs(10));
//! let payload = client.fetch(Dataset::All).await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod fifo;
pub mod frame;
pub mod handler;
pub mod memory;
pub mod protocol;
pub mod server;

pub use client::StatusClient;
pub use error::{PipeError, PipeResult};
pub use fifo::FifoPipe;
pub use handler::PipeHandler;
pub use memory::{MemoryPipe, memory_pipe};
pub use protocol::{Dataset, StatusPayload, StatusRequest, StatusResponse};
pub use server::{Exchange, PipeServer, RequestHandler};
