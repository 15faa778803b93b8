//! Aggregation of a [`StatusSnapshot`] into named metric samples.
//!
//! The output order and the set of names are fixed: every snapshot, empty or
//! not, yields the same catalog in the same order. Distinct counts go through
//! `BTreeSet`, so no hash iteration order reaches the output.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{NO_CLUSTER_NODE, StatusSnapshot};

/// One named value computed from a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Metric name without namespace, stable across calls.
    pub name: String,
    /// Human-readable description.
    pub help: String,
    /// Current value.
    pub value: f64,
}

impl MetricSample {
    fn new(name: &str, help: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            value,
        }
    }
}

/// Catalog entry: name and help text, in output order.
pub const CATALOG: [(&str, &str); 18] = [
    ("statusd_up", "1 if the status daemon answered the request"),
    ("server_up", "1 if the Samba server has running processes"),
    ("client_count", "Number of distinct clients connected to the server"),
    ("individual_user_count", "Number of distinct users connected to the server"),
    ("pid_count", "Number of distinct server processes serving clients"),
    ("cluster_node_count", "Number of distinct cluster nodes reported"),
    ("share_count", "Number of distinct shares in use"),
    ("share_connection_count", "Number of share connections"),
    ("encrypted_connection_count", "Number of encrypted share connections"),
    ("signed_connection_count", "Number of signed share connections"),
    ("locked_file_count", "Number of locked files"),
    ("locked_share_count", "Number of shares with locked files"),
    ("smbd_process_count", "Number of smbd processes"),
    ("smbd_cpu_usage_percentage", "CPU usage of all smbd processes in percent"),
    ("smbd_memory_usage_percentage", "Memory usage of all smbd processes in percent"),
    ("smbd_resident_memory_bytes", "Resident memory of all smbd processes in bytes"),
    ("smbd_virtual_memory_bytes", "Virtual memory of all smbd processes in bytes"),
    ("smbd_thread_count", "Number of threads of all smbd processes"),
];

/// Computes the full catalog for one snapshot.
///
/// Pure and deterministic: equal snapshots give equal output, in
/// [`CATALOG`] order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(snapshot: &StatusSnapshot) -> Vec<MetricSample> {
    let processes = &snapshot.processes;
    let shares = &snapshot.shares;
    let locks = &snapshot.locks;
    let ps = &snapshot.ps_data;

    let clients: BTreeSet<&str> = processes.iter().map(|p| p.machine.as_str()).collect();
    let users: BTreeSet<i64> = processes.iter().map(|p| p.user_id).collect();
    let pids: BTreeSet<(i32, u32)> = processes
        .iter()
        .map(|p| (p.cluster_node_id, p.process_id))
        .collect();
    let nodes: BTreeSet<i32> = processes
        .iter()
        .map(|p| p.cluster_node_id)
        .chain(shares.iter().map(|s| s.cluster_node_id))
        .chain(locks.iter().map(|l| l.cluster_node_id))
        .filter(|node| *node > NO_CLUSTER_NODE)
        .collect();
    let services: BTreeSet<&str> = shares.iter().map(|s| s.service.as_str()).collect();
    let locked_shares: BTreeSet<&str> = locks.iter().map(|l| l.share_path.as_str()).collect();

    let server_up = !processes.is_empty() || !ps.is_empty();

    let values: [f64; 18] = [
        1.0,
        if server_up { 1.0 } else { 0.0 },
        clients.len() as f64,
        users.len() as f64,
        pids.len() as f64,
        nodes.len() as f64,
        services.len() as f64,
        shares.len() as f64,
        shares.iter().filter(|s| s.is_encrypted()).count() as f64,
        shares.iter().filter(|s| s.is_signed()).count() as f64,
        locks.len() as f64,
        locked_shares.len() as f64,
        ps.len() as f64,
        ps.iter().map(|p| p.cpu_percent).sum(),
        ps.iter().map(|p| p.memory_percent).sum(),
        ps.iter().map(|p| p.resident_bytes as f64).sum(),
        ps.iter().map(|p| p.virtual_bytes as f64).sum(),
        ps.iter().map(|p| f64::from(p.threads)).sum(),
    ];

    CATALOG
        .iter()
        .zip(values)
        .map(|((name, help), value)| MetricSample::new(name, help, value))
        .collect()
}
