//! Falsification Tests: Category A - Table Parsing (F001-F019)

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use smbx_core::{NO_CLUSTER_NODE, NullLogger, UNKNOWN_ID, parse_locks, parse_processes, parse_shares};
use smbx_test::RecordingLogger;
use smbx_test::fixtures::{self, with_rows};

const KNOWN_GOOD_LOCK: &str =
    "1234 0 DENY_NONE RDONLY NONE - /srv/share file.txt Mon Jan 2 15:04:05 2006";

// =============================================================================
// F001-F005: Locks
// =============================================================================

/// F001: A well-formed lock row yields exactly one record with its fields
#[test]
fn f001_known_good_lock_row() {
    let logger = RecordingLogger::new();
    let locks = parse_locks(&with_rows(fixtures::LOCKS, &[KNOWN_GOOD_LOCK]), &logger);

    assert_eq!(locks.len(), 1, "F001 FALSIFIED: expected one lock, got {}", locks.len());
    let lock = &locks[0];
    assert_eq!(lock.process_id, 1234, "F001 FALSIFIED: wrong process id");
    assert_eq!(lock.cluster_node_id, NO_CLUSTER_NODE, "F001 FALSIFIED: unclustered row got a node");
    assert_eq!(lock.name, "file.txt", "F001 FALSIFIED: wrong name {:?}", lock.name);
    assert_eq!(
        lock.timestamp,
        Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap(),
        "F001 FALSIFIED: wrong timestamp"
    );
    assert_eq!(logger.error_count(), 0, "F001 FALSIFIED: errors logged for a good row");
}

/// F002: A `node:pid` process id splits into cluster node and pid
#[test]
fn f002_cluster_prefixed_lock_row() {
    let row = format!("2:{KNOWN_GOOD_LOCK}");
    let locks = parse_locks(&with_rows(fixtures::LOCKS, &[&row]), &NullLogger);

    assert_eq!(locks.len(), 1, "F002 FALSIFIED: clustered row dropped");
    assert_eq!(locks[0].cluster_node_id, 2, "F002 FALSIFIED: wrong cluster node");
    assert_eq!(locks[0].process_id, 1234, "F002 FALSIFIED: wrong process id");
}

/// F003: An unexpected header empties the table whatever rows follow
#[test]
fn f003_header_mismatch_empties_table() {
    let report = fixtures::LOCKS.replacen("Pid ", "PID ", 1);
    let logger = RecordingLogger::new();

    assert!(
        parse_locks(&report, &logger).is_empty(),
        "F003 FALSIFIED: rows accepted under a foreign header"
    );
    assert_eq!(logger.error_count(), 1, "F003 FALSIFIED: mismatch not logged once");
}

/// F004: A bad row is skipped alone, with the offending field named
#[test]
fn f004_bad_row_skipped_alone() {
    let bad = KNOWN_GOOD_LOCK.replacen("1234", "12x4", 1);
    let logger = RecordingLogger::new();
    let locks = parse_locks(
        &with_rows(fixtures::LOCKS, &[KNOWN_GOOD_LOCK, &bad, KNOWN_GOOD_LOCK]),
        &logger,
    );

    assert_eq!(locks.len(), 2, "F004 FALSIFIED: a bad row took neighbours with it");
    let errors = logger.errors();
    assert_eq!(errors.len(), 1, "F004 FALSIFIED: expected one diagnostic");
    assert!(
        errors[0].contains("LockData") && errors[0].contains("PID"),
        "F004 FALSIFIED: diagnostic lacks context: {}",
        errors[0]
    );
}

/// F005: `No locked files` is an empty result, not an error
#[test]
fn f005_no_locked_files() {
    let logger = RecordingLogger::new();
    assert!(parse_locks(fixtures::NO_LOCKS, &logger).is_empty());
    assert_eq!(logger.error_count(), 0, "F005 FALSIFIED: empty report logged as error");
}

/// F013: Every unsigned 32-bit uid is kept, including ones past `i32::MAX`
#[test]
fn f013_large_uid_kept() {
    let logger = RecordingLogger::new();
    let row = KNOWN_GOOD_LOCK.replacen(" 0 ", " 4294967294 ", 1);
    let locks = parse_locks(&with_rows(fixtures::LOCKS, &[&row]), &logger);
    assert_eq!(locks.len(), 1, "F013 FALSIFIED: lock with a large uid dropped");
    assert_eq!(locks[0].user_id, 4_294_967_294, "F013 FALSIFIED: uid altered");
    assert_eq!(logger.error_count(), 0, "F013 FALSIFIED: large uid reported as an error");
}

// =============================================================================
// F006-F010: Shares and processes
// =============================================================================

/// F006: `nobody`/`nogroup` map to the unknown id; other words are skipped
#[test]
fn f006_nobody_nogroup_sentinels() {
    let processes = parse_processes(fixtures::PROCESSES, &NullLogger);
    let anonymous = processes
        .iter()
        .find(|p| p.process_id == 1122)
        .expect("F006 FALSIFIED: anonymous process dropped");
    assert_eq!(anonymous.user_id, UNKNOWN_ID, "F006 FALSIFIED: nobody not mapped");
    assert_eq!(anonymous.group_id, UNKNOWN_ID, "F006 FALSIFIED: nogroup not mapped");

    let report = fixtures::PROCESSES.replace("nobody ", "guest  ");
    let logger = RecordingLogger::new();
    let processes = parse_processes(&report, &logger);
    assert_eq!(processes.len(), 2, "F006 FALSIFIED: non-numeric user accepted");
    assert!(
        logger.errors()[0].contains("UserID"),
        "F006 FALSIFIED: skip does not name the field"
    );
}

/// F007: Meridiem and 24-hour share rows parse side by side
#[test]
fn f007_share_time_layouts() {
    let shares = parse_shares(fixtures::SHARES, &NullLogger);
    assert_eq!(shares.len(), 3, "F007 FALSIFIED: a share row was lost");
    assert_eq!(shares[0].service, "IPC$");
    assert!(shares[0].connected_at.is_some(), "F007 FALSIFIED: meridiem time not parsed");
    assert_eq!(
        shares[0].connected_at,
        shares[1].connected_at,
        "F007 FALSIFIED: 02:07:02 PM and 14:07:02 differ"
    );
}

/// F008: Clustered share reports carry cluster nodes
#[test]
fn f008_cluster_share_layout() {
    let shares = parse_shares(fixtures::CLUSTER_SHARES, &NullLogger);
    let nodes: Vec<i32> = shares.iter().map(|s| s.cluster_node_id).collect();
    assert_eq!(nodes, vec![1, 2], "F008 FALSIFIED: wrong cluster nodes");
}

/// F009: A processes report without its banner is rejected
#[test]
fn f009_processes_require_banner() {
    let report = fixtures::PROCESSES.replace("Samba version 4.13.5-Debian", "");
    let logger = RecordingLogger::new();
    assert!(
        parse_processes(&report, &logger).is_empty(),
        "F009 FALSIFIED: rows accepted without banner"
    );
    assert_eq!(logger.error_count(), 1);
}

/// F010: The server version comes from the banner
#[test]
fn f010_server_version_from_banner() {
    let processes = parse_processes(fixtures::PROCESSES, &NullLogger);
    assert!(
        processes.iter().all(|p| p.server_version == "4.13.5-Debian"),
        "F010 FALSIFIED: server version not propagated"
    );
}

// =============================================================================
// F011-F012: Robustness
// =============================================================================

proptest! {
    /// F011: Truncation never yields more records than the full report
    #[test]
    fn f011_truncation_never_adds_records(cut in 0usize..1000) {
        let parsers: [(&str, fn(&str) -> usize); 3] = [
            (fixtures::LOCKS, |t| parse_locks(t, &NullLogger).len()),
            (fixtures::SHARES, |t| parse_shares(t, &NullLogger).len()),
            (fixtures::PROCESSES, |t| parse_processes(t, &NullLogger).len()),
        ];
        for (report, parse) in parsers {
            let full = parse(report);
            let truncated = report.get(..cut.min(report.len())).unwrap_or(report);
            let got = parse(truncated);
            prop_assert!(got <= full, "F011 FALSIFIED: {got} records from a prefix of a {full}-record report");
        }
    }

    /// F012: Arbitrary text never panics
    #[test]
    fn f012_arbitrary_text_never_panics(text in "(?s).{0,400}") {
        let _ = parse_locks(&text, &NullLogger);
        let _ = parse_shares(&text, &NullLogger);
        let _ = parse_processes(&text, &NullLogger);
    }
}
