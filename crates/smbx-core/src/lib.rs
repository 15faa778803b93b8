// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # smbx-core
//!
//! Data model and pure logic shared by the smbx status daemon and exporter.
//!
//! - [`types`]: lock, share, process and ps records plus [`StatusSnapshot`]
//! - [`parser`]: fault-tolerant reader for `smbstatus` tables
//! - [`stats`]: deterministic aggregation into [`MetricSample`]s
//! - [`log`]: the [`StatusLogger`] capability the parser reports through
//! - [`config`]: pipe configuration and TOML loading
//!
//! Nothing here performs I/O besides reading configuration files.
//!
//! ## Example
//!
//! ```rust
//! use smbx_core::{NullLogger, parse_locks, aggregate, StatusSnapshot};
//!
//! let report = "No locked files\n";
//! let snapshot = StatusSnapshot {
//!     locks: parse_locks(report, &NullLogger),
//!     ..Default::default()
//! };
//! let samples = aggregate(&snapshot);
//! assert_eq!(samples[0].name, "statusd_up");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod log;
pub mod parser;
pub mod stats;
pub mod types;

pub use config::{
    DEFAULT_MAX_FRAME_BYTES, DEFAULT_REQUEST_PIPE, DEFAULT_RESPONSE_PIPE, PipeConfig, load_toml,
};
pub use error::{Result, RowError, SmbxError, TableError};
pub use log::{NullLogger, StatusLogger, TracingLogger};
pub use parser::{parse_locks, parse_processes, parse_shares};
pub use stats::{CATALOG, MetricSample, aggregate};
pub use types::{
    LockRecord, NO_CLUSTER_NODE, ProcessRecord, PsRecord, ShareRecord, StatusSnapshot,
    UNKNOWN_ID,
};
