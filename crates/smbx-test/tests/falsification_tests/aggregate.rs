//! Falsification Tests: Category B - Aggregation (F020-F029)

use std::collections::BTreeMap;

use smbx_core::{CATALOG, NullLogger, StatusSnapshot, aggregate, parse_locks, parse_processes, parse_shares};
use smbx_statusd::parse_ps;
use smbx_test::fixtures;

fn fixture_snapshot(shares: &str) -> StatusSnapshot {
    StatusSnapshot {
        locks: parse_locks(fixtures::LOCKS, &NullLogger),
        shares: parse_shares(shares, &NullLogger),
        processes: parse_processes(fixtures::PROCESSES, &NullLogger),
        ps_data: parse_ps(fixtures::PS, "smbd"),
    }
}

fn values(snapshot: &StatusSnapshot) -> BTreeMap<String, f64> {
    aggregate(snapshot)
        .into_iter()
        .map(|s| (s.name, s.value))
        .collect()
}

/// F020: Identical snapshots give identical ordered output
#[test]
fn f020_aggregation_is_deterministic() {
    let snapshot = fixture_snapshot(fixtures::SHARES);
    let first = aggregate(&snapshot);
    let second = aggregate(&snapshot.clone());
    assert_eq!(first, second, "F020 FALSIFIED: output differs between calls");
}

/// F021: The catalog is complete and ordered even for an empty snapshot
#[test]
fn f021_catalog_is_stable() {
    for snapshot in [StatusSnapshot::default(), fixture_snapshot(fixtures::SHARES)] {
        let names: Vec<String> = aggregate(&snapshot).into_iter().map(|s| s.name).collect();
        let expected: Vec<&str> = CATALOG.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, expected, "F021 FALSIFIED: catalog changed with the data");
    }
}

/// F022: Fixture reports aggregate to the values an operator would count
#[test]
fn f022_fixture_values() {
    let v = values(&fixture_snapshot(fixtures::SHARES));
    let expect = [
        ("statusd_up", 1.0),
        ("server_up", 1.0),
        ("client_count", 3.0),
        ("individual_user_count", 2.0),
        ("pid_count", 3.0),
        ("cluster_node_count", 0.0),
        ("share_count", 2.0),
        ("share_connection_count", 3.0),
        ("encrypted_connection_count", 1.0),
        ("signed_connection_count", 2.0),
        ("locked_file_count", 2.0),
        ("locked_share_count", 1.0),
        ("smbd_process_count", 2.0),
        ("smbd_thread_count", 3.0),
        ("smbd_resident_memory_bytes", (20480.0 + 32768.0) * 1024.0),
        ("smbd_virtual_memory_bytes", (90112.0 + 102_400.0) * 1024.0),
    ];
    for (name, want) in expect {
        assert_eq!(v[name], want, "F022 FALSIFIED: {name} = {}, expected {want}", v[name]);
    }
    assert!(
        (v["smbd_cpu_usage_percentage"] - 1.7).abs() < 1e-9,
        "F022 FALSIFIED: cpu sum {}",
        v["smbd_cpu_usage_percentage"]
    );
}

/// F023: Cluster nodes are counted once each
#[test]
fn f023_cluster_nodes_counted() {
    let v = values(&fixture_snapshot(fixtures::CLUSTER_SHARES));
    assert_eq!(v["cluster_node_count"], 2.0, "F023 FALSIFIED: wrong node count");
}

/// F024: A server with no processes and no workers reports down
#[test]
fn f024_empty_snapshot_is_down() {
    let v = values(&StatusSnapshot::default());
    assert_eq!(v["statusd_up"], 1.0);
    assert_eq!(v["server_up"], 0.0, "F024 FALSIFIED: empty server reported up");
    assert!(
        v.iter().filter(|(name, _)| name.as_str() != "statusd_up").all(|(_, value)| *value == 0.0),
        "F024 FALSIFIED: non-zero value from an empty snapshot"
    );
}
