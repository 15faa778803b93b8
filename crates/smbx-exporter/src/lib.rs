// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # smbx-exporter
//!
//! Unprivileged side of smbx: asks `smbx-statusd` for a status snapshot on
//! every scrape and exposes the aggregated values as Prometheus gauges.
//!
//! - [`SambaCollector`]: describe/collect adapter with an append-only
//!   descriptor registry
//! - [`SnapshotSource`]: where snapshots come from, [`PipeSnapshotSource`]
//!   in production
//! - [`MetricsServer`]: `tiny_http` endpoint serving the text format
//! - [`ExporterConfig`]: TOML configuration
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use smbx_core::TracingLogger;
//! use smbx_exporter::{PipeSnapshotSource, SambaCollector, scrape};
//!
//! let source = PipeSnapshotSource::new(client, Arc::new(TracingLogger));
//! let mut collector = SambaCollector::new(source, "samba", Arc::new(TracingLogger));
//! let body = scrape(&mut collector).await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod collector;
pub mod config;
pub mod error;
pub mod http;
pub mod snapshot;

pub use collector::{DEFAULT_NAMESPACE, MACHINE_LABEL, SambaCollector};
pub use config::ExporterConfig;
pub use error::{ExporterError, Result};
pub use http::{MetricsServer, SharedCollector, scrape};
pub use snapshot::{PipeSnapshotSource, SnapshotSource, snapshot_from_payload};
