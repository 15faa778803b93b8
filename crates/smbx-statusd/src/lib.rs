// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # smbx-statusd
//!
//! Privileged side of smbx. `smbstatus` needs root, the exporter does not, so
//! this daemon runs the commands and hands their raw output to the exporter
//! over a named-pipe pair.
//!
//! - [`StatusDaemon`]: the [`RequestHandler`](smbx_pipe::RequestHandler)
//!   that runs the commands
//! - [`CommandRunner`]: process execution seam, [`SystemCommandRunner`] in
//!   production
//! - [`RequestMetrics`]: RED counters for handled requests
//! - [`StatusdConfig`]: TOML configuration

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod command;
pub mod config;
pub mod daemon;
pub mod error;
pub mod metrics;
pub mod ps;

pub use command::{CommandRunner, SystemCommandRunner};
pub use config::StatusdConfig;
pub use daemon::StatusDaemon;
pub use error::{Result, StatusdError};
pub use metrics::{MetricsSnapshot, RequestMetrics};
pub use ps::parse_ps;
