//! Status records parsed from `smbstatus` reports.
//!
//! Records have no identity beyond the snapshot they belong to. Identifier
//! fields that may be absent in the source use the `-1` sentinel instead of
//! `Option`, matching the reports' own convention.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Cluster node id of a row produced by a non-clustered server.
pub const NO_CLUSTER_NODE: i32 = -1;

/// User or group id reported as `nobody`/`nogroup`.
///
/// Ids are `i64` so every unsigned 32-bit id fits next to the sentinel.
pub const UNKNOWN_ID: i64 = -1;

/// One row of the `smbstatus -L -n` locked files table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Server process holding the lock.
    pub process_id: u32,
    /// Cluster node, or [`NO_CLUSTER_NODE`].
    pub cluster_node_id: i32,
    /// Numeric user id.
    pub user_id: i64,
    /// Share deny mode, e.g. `DENY_NONE`.
    pub deny_mode: String,
    /// Access mask as printed.
    pub access: String,
    /// Read/write mode, e.g. `RDONLY`.
    pub access_mode: String,
    /// Oplock state.
    pub oplock: String,
    /// Local path of the share.
    pub share_path: String,
    /// Client-visible file name, may contain spaces.
    pub name: String,
    /// Time the lock was taken.
    pub timestamp: DateTime<Utc>,
}

impl LockRecord {
    /// Returns true if the row came from a clustered server.
    #[must_use]
    pub const fn is_clustered(&self) -> bool {
        self.cluster_node_id > NO_CLUSTER_NODE
    }
}

impl fmt::Display for LockRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clustered() {
            write!(f, "ClusterNodeId: {}; ", self.cluster_node_id)?;
        }
        write!(
            f,
            "PID: {}; UserID: {}; DenyMode: {}; Access: {}; AccessMode: {}; Oplock: {}; SharePath: {}; Name: {}; Time: {};",
            self.process_id,
            self.user_id,
            self.deny_mode,
            self.access,
            self.access_mode,
            self.oplock,
            self.share_path,
            self.name,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// One row of the `smbstatus -S -n` shares table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    /// Share name, empty for the cluster layout which does not print it.
    pub service: String,
    /// Server process serving the connection.
    pub process_id: u32,
    /// Cluster node, or [`NO_CLUSTER_NODE`].
    pub cluster_node_id: i32,
    /// Client machine.
    pub machine: String,
    /// Connection time; the cluster layout has no such column.
    pub connected_at: Option<DateTime<Utc>>,
    /// Encryption state, `-` when off.
    pub encryption: String,
    /// Signing state, `-` when off.
    pub signing: String,
}

impl ShareRecord {
    /// Returns true if the row came from a clustered server.
    #[must_use]
    pub const fn is_clustered(&self) -> bool {
        self.cluster_node_id > NO_CLUSTER_NODE
    }

    /// Returns true if the connection is encrypted.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.encryption != "-"
    }

    /// Returns true if the connection is signed.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.signing != "-"
    }
}

impl fmt::Display for ShareRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service: {}; ", self.service)?;
        if self.is_clustered() {
            write!(f, "ClusterNodeId: {}; ", self.cluster_node_id)?;
        }
        let connected_at = self.connected_at.map_or_else(
            || "-".to_string(),
            |t| t.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        write!(
            f,
            "PID: {}; Machine: {}; ConnectedAt: {}; Encryption: {}; Signing: {};",
            self.process_id, self.machine, connected_at, self.encryption, self.signing
        )
    }
}

/// One row of the `smbstatus -p -n` processes table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Server process id.
    pub process_id: u32,
    /// Cluster node, or [`NO_CLUSTER_NODE`].
    pub cluster_node_id: i32,
    /// Numeric user id, or [`UNKNOWN_ID`] for `nobody`.
    pub user_id: i64,
    /// Numeric group id, or [`UNKNOWN_ID`] for `nogroup`.
    pub group_id: i64,
    /// Client machine, address plus transport detail.
    pub machine: String,
    /// Negotiated protocol, e.g. `SMB3_11`.
    pub protocol_version: String,
    /// Encryption state.
    pub encryption: String,
    /// Signing state.
    pub signing: String,
    /// Server version from the report banner.
    pub server_version: String,
}

impl ProcessRecord {
    /// Returns true if the row came from a clustered server.
    #[must_use]
    pub const fn is_clustered(&self) -> bool {
        self.cluster_node_id > NO_CLUSTER_NODE
    }
}

impl fmt::Display for ProcessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clustered() {
            write!(f, "ClusterNodeId: {}; ", self.cluster_node_id)?;
        }
        write!(
            f,
            "PID: {}; UserID: {}; GroupID: {}; Machine: {}; ProtocolVersion: {}; Encryption: {}; Signing: {};",
            self.process_id,
            self.user_id,
            self.group_id,
            self.machine,
            self.protocol_version,
            self.encryption,
            self.signing
        )
    }
}

/// Resource usage of one server worker process, as listed by `ps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsRecord {
    /// OS process id.
    pub process_id: u32,
    /// CPU usage in percent of one core.
    pub cpu_percent: f64,
    /// Resident memory in percent of physical memory.
    pub memory_percent: f64,
    /// Resident set size in bytes.
    pub resident_bytes: u64,
    /// Virtual memory size in bytes.
    pub virtual_bytes: u64,
    /// Number of threads.
    pub threads: u32,
    /// Command name.
    pub command: String,
}

/// All records obtained from one request/response cycle.
///
/// The three tables come from separate command invocations, so a process may
/// exit between two of them; records are not cross-checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Locked files.
    pub locks: Vec<LockRecord>,
    /// Share connections.
    pub shares: Vec<ShareRecord>,
    /// Server processes.
    pub processes: Vec<ProcessRecord>,
    /// Worker process resource usage.
    pub ps_data: Vec<PsRecord>,
}

impl StatusSnapshot {
    /// Returns true if no table yielded a record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
            && self.shares.is_empty()
            && self.processes.is_empty()
            && self.ps_data.is_empty()
    }
}
