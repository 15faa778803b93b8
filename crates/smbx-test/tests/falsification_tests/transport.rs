//! Falsification Tests: Category C - Transport (F030-F039)

use std::time::Duration;

use smbx_pipe::frame::{self, HEADER_LEN};
use smbx_pipe::{
    Dataset, Exchange, MemoryPipe, PipeError, PipeHandler, PipeServer, StatusClient, StatusRequest,
    StatusResponse, memory_pipe,
};
use smbx_exporter::ExporterConfig;
use smbx_statusd::{StatusDaemon, StatusdConfig};
use smbx_test::{Script, ScriptedCommands, StatusHarness, fixtures};
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

const MAX: usize = 64 * 1024;

/// F030: A full request returns exactly what each command printed
#[tokio::test]
async fn f030_round_trip_matches_command_output() {
    let (mut client, daemon) = StatusHarness::new().start();
    let payload = assert_ok!(client.fetch(Dataset::All).await);

    assert_eq!(payload.locks.as_deref(), Some(fixtures::LOCKS), "F030 FALSIFIED: locks altered");
    assert_eq!(payload.shares.as_deref(), Some(fixtures::SHARES), "F030 FALSIFIED: shares altered");
    assert_eq!(
        payload.processes.as_deref(),
        Some(fixtures::PROCESSES),
        "F030 FALSIFIED: processes altered"
    );
    let pids: Vec<u32> = payload.ps_data.unwrap().iter().map(|p| p.process_id).collect();
    assert_eq!(pids, vec![1100, 1120], "F030 FALSIFIED: ps data altered");
    daemon.stop().await.unwrap();
}

/// F031: Sequential exchanges never see each other's data
#[tokio::test]
async fn f031_no_cross_talk() {
    let (mut client, daemon) = StatusHarness::new().start();
    for i in 0..20 {
        let marker = format!("report {i}\n");
        daemon.commands().update(|script| script.shares.clone_from(&marker));
        let payload = client.fetch(Dataset::Shares).await.unwrap();
        assert_eq!(
            payload.shares.as_deref(),
            Some(marker.as_str()),
            "F031 FALSIFIED: exchange {i} returned another exchange's data"
        );
        assert!(payload.locks.is_none(), "F031 FALSIFIED: unrequested data set sent");
    }
    assert_eq!(daemon.metrics().requests_total(), 20);
    daemon.stop().await.unwrap();
}

/// F032: A late answer times out and never leaks into the next exchange
#[tokio::test(start_paused = true)]
async fn f032_timeout_then_fresh_data() {
    let script = Script {
        delay_next: Some(Duration::from_millis(400)),
        ..Script::default()
    };
    let (mut client, daemon) = StatusHarness::new()
        .with_script(script)
        .with_timeout(Duration::from_millis(300))
        .start();

    let first = assert_err!(client.fetch(Dataset::Locks).await);
    assert!(
        matches!(first, PipeError::Timeout(_)),
        "F032 FALSIFIED: slow daemon did not time out: {first:?}"
    );

    daemon
        .commands()
        .update(|script| script.locks = fixtures::NO_LOCKS.to_string());
    let second = client.fetch(Dataset::Locks).await.unwrap();
    assert_eq!(
        second.locks.as_deref(),
        Some(fixtures::NO_LOCKS),
        "F032 FALSIFIED: stale answer returned after a timeout"
    );
    daemon.stop().await.unwrap();
}

/// F033: A missing daemon is a connection error
#[tokio::test]
async fn f033_absent_responder() {
    let (_writer, reader) = memory_pipe("response", MAX, MAX);
    let mut client = StatusClient::new(MemoryPipe::unavailable("request"), reader, Duration::from_secs(1));
    let result = client.fetch(Dataset::All).await;
    assert!(
        matches!(result, Err(PipeError::Connection { .. })),
        "F033 FALSIFIED: expected connection error, got {result:?}"
    );
}

/// F034: A failing command is an upstream failure, not an empty success
#[tokio::test]
async fn f034_command_failure_is_upstream() {
    let script = Script {
        failing: Some("-S"),
        ..Script::default()
    };
    let (mut client, daemon) = StatusHarness::new().with_script(script).start();

    let result = client.fetch(Dataset::All).await;
    assert!(
        matches!(&result, Err(PipeError::Upstream(msg)) if msg.contains("smbstatus -S -n")),
        "F034 FALSIFIED: expected upstream failure, got {result:?}"
    );
    assert_eq!(daemon.metrics().errors_total(), 1);

    // Other data sets are unaffected.
    assert_ok!(client.fetch(Dataset::Locks).await);
    daemon.stop().await.unwrap();
}

/// F035: An undecodable response is a protocol error
#[tokio::test]
async fn f035_corrupt_response_is_protocol_error() {
    let (req_w, mut req_r) = memory_pipe("request", MAX, MAX);
    let (mut resp_w, resp_r) = memory_pipe("response", MAX, MAX);
    let mut client = StatusClient::new(req_w, resp_r, Duration::from_secs(5));

    let responder = async {
        req_r.open().await.unwrap();
        let body = req_r.read_frame(None).await.unwrap();
        let _: StatusRequest = frame::from_body(&body).unwrap();
        resp_w.open().await.unwrap();
        resp_w.write_frame(b"not json").await.unwrap();
    };
    let (result, ()) = tokio::join!(client.send(Dataset::All), responder);
    assert!(
        matches!(result, Err(PipeError::Protocol(_))),
        "F035 FALSIFIED: expected protocol error, got {result:?}"
    );
}

/// F036: Frames over the limit are refused before anything is written
#[test]
fn f036_frame_limit() {
    let body = vec![b'x'; 1025];
    assert!(
        matches!(
            frame::encode_frame(&body, 1024),
            Err(PipeError::FrameTooLarge { size: 1025, max: 1024 })
        ),
        "F036 FALSIFIED: oversized frame encoded"
    );
    let frame = frame::encode_frame(&body[..1024], 1024).unwrap();
    assert_eq!(frame.len(), HEADER_LEN + 1024, "F036 FALSIFIED: wrong frame length");
}

/// F037: A status report as large as a busy server prints fits the default limit
#[tokio::test]
async fn f037_large_report_round_trip() {
    let row = "1121         1000       DENY_NONE  0x120089    RDONLY     NONE             /srv/data   notes.txt   Sun May 16 14:09:12 2021\n";
    let rows: Vec<&str> = std::iter::repeat_n(row.trim_end(), 5000).collect();
    let report = fixtures::with_rows(fixtures::LOCKS, &rows);
    let script = Script {
        locks: report.clone(),
        ..Script::default()
    };
    let (mut client, daemon) = StatusHarness::new().with_script(script).start();

    let payload = client.fetch(Dataset::Locks).await.unwrap();
    assert_eq!(payload.locks.map(|l| l.len()), Some(report.len()), "F037 FALSIFIED: report truncated");
    daemon.stop().await.unwrap();
}

/// F038: The daemon echoes the caller's request id, whatever it is
#[tokio::test]
async fn f038_response_echoes_request_id() {
    let (mut req_w, req_r) = memory_pipe("request", MAX, MAX);
    let (resp_w, mut resp_r) = memory_pipe("response", MAX, MAX);
    let daemon = StatusDaemon::new(
        StatusdConfig::default(),
        ScriptedCommands::new(Script::default()),
    );
    let mut server = PipeServer::new(req_r, resp_w);

    for _ in 0..3 {
        let request = StatusRequest {
            id: Uuid::new_v4(),
            dataset: Dataset::Processes,
        };
        req_w.open().await.unwrap();
        req_w.write_frame(&frame::to_body(&request).unwrap()).await.unwrap();
        resp_r.open().await.unwrap();

        assert_eq!(server.serve_one(&daemon).await.unwrap(), Exchange::Answered);

        let body = resp_r.read_frame(None).await.unwrap();
        let response: StatusResponse = frame::from_body(&body).unwrap();
        assert_eq!(
            response.request_id, request.id,
            "F038 FALSIFIED: response answers another request"
        );
        assert_eq!(response.payload.processes.as_deref(), Some(fixtures::PROCESSES));
    }
}

/// F039: By default the exporter waits out a request that hits every command limit
#[test]
fn f039_default_wait_covers_daemon_budget() {
    let exporter = ExporterConfig::default();
    let daemon = StatusdConfig::default();
    assert!(
        exporter.response_timeout > daemon.request_budget(),
        "F039 FALSIFIED: exporter gives up after {:?}, daemon may need {:?}",
        exporter.response_timeout,
        daemon.request_budget()
    );
}
