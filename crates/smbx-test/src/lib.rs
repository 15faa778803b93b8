// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # smbx-test
//!
//! Testing infrastructure for smbx.
//!
//! - [`StatusHarness`]: a real daemon and pipe server over memory pipes, fed
//!   by [`ScriptedCommands`]
//! - [`fixtures`]: captured `smbstatus` and `ps` output
//! - [`RecordingLogger`]: a [`StatusLogger`](smbx_core::StatusLogger) that
//!   keeps every message
//!
//! The falsification suite under `tests/` drives the whole chain through
//! these: scripted command, daemon, transport, parser, aggregator and
//! collector.
//!
//! ## Example
//!
//! ```rust,ignore
//! use smbx_pipe::Dataset;
//! use smbx_test::StatusHarness;
//!
//! let (mut client, daemon) = StatusHarness::new().start();
//! let payload = client.fetch(Dataset::All).await?;
//! daemon.stop().await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod fixtures;
pub mod harness;
pub mod logger;

pub use error::{Result, TestError};
pub use harness::{DaemonHandle, Script, ScriptedCommands, StatusHarness};
pub use logger::{Entry, Level, RecordingLogger};
