//! smbx: Samba status exporter
//!
//! A privileged daemon runs `smbstatus`; an unprivileged exporter asks it for
//! the reports over a pair of named pipes and serves them as Prometheus
//! metrics.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use smbx::prelude::*;
//!
//! let locks = parse_locks("No locked files\n", &NullLogger);
//! let samples = aggregate(&StatusSnapshot { locks, ..Default::default() });
//! assert_eq!(samples.len(), CATALOG.len());
//! ```

pub use smbx_core as core;
pub use smbx_exporter as exporter;
pub use smbx_pipe as pipe;
pub use smbx_statusd as statusd;

/// Prelude module for common imports.
pub mod prelude {
    pub use smbx_core::{
        CATALOG, LockRecord, MetricSample, NullLogger, ProcessRecord, PsRecord, ShareRecord,
        StatusLogger, StatusSnapshot, TracingLogger, aggregate, parse_locks, parse_processes,
        parse_shares,
    };
    pub use smbx_exporter::{
        ExporterConfig, MetricsServer, PipeSnapshotSource, SambaCollector, SnapshotSource, scrape,
    };
    pub use smbx_pipe::{
        Dataset, FifoPipe, MemoryPipe, PipeError, PipeHandler, PipeServer, RequestHandler,
        StatusClient, StatusPayload,
    };
    pub use smbx_statusd::{CommandRunner, StatusDaemon, StatusdConfig, SystemCommandRunner};
}
