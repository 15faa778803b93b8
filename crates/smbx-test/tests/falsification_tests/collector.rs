//! Falsification Tests: Category D - Collector and Endpoint (F040-F049)

use std::sync::Arc;
use std::time::Duration;

use prometheus::proto::MetricFamily;
use smbx_core::CATALOG;
use smbx_exporter::{PipeSnapshotSource, SambaCollector, scrape};
use smbx_pipe::{MemoryPipe, StatusClient, memory_pipe};
use smbx_test::{DaemonHandle, RecordingLogger, Script, StatusHarness, fixtures};

type Collector = SambaCollector<PipeSnapshotSource<MemoryPipe, MemoryPipe>>;

fn collector(script: Script) -> (Collector, DaemonHandle, Arc<RecordingLogger>) {
    let logger = Arc::new(RecordingLogger::new());
    let (client, daemon) = StatusHarness::new().with_script(script).start();
    let source = PipeSnapshotSource::new(client, logger.clone());
    (SambaCollector::new(source, "samba", logger.clone()), daemon, logger)
}

fn value(families: &[MetricFamily], name: &str) -> Option<f64> {
    families
        .iter()
        .find(|f| f.get_name() == name)
        .map(|f| f.get_metric()[0].get_gauge().get_value())
}

/// F040: Describe then collect exposes the whole catalog with live values
#[tokio::test]
async fn f040_end_to_end_collect() {
    let (mut collector, daemon, logger) = collector(Script::default());

    assert_eq!(collector.describe().await.len(), CATALOG.len(), "F040 FALSIFIED: catalog not described");
    let families = collector.collect().await;
    assert_eq!(families.len(), CATALOG.len(), "F040 FALSIFIED: samples missing");
    assert_eq!(value(&families, "samba_locked_file_count"), Some(2.0));
    assert_eq!(value(&families, "samba_share_connection_count"), Some(3.0));
    assert_eq!(value(&families, "samba_smbd_process_count"), Some(2.0));
    assert_eq!(logger.error_count(), 0, "F040 FALSIFIED: clean run logged errors");
    daemon.stop().await.unwrap();
}

/// F041: Describe without a daemon registers nothing and does not crash
#[tokio::test]
async fn f041_describe_failure_registers_nothing() {
    let logger = Arc::new(RecordingLogger::new());
    let (_writer, reader) = memory_pipe("response", 1024, 1024);
    let client = StatusClient::new(MemoryPipe::unavailable("request"), reader, Duration::from_secs(1));
    let mut collector = SambaCollector::new(
        PipeSnapshotSource::new(client, logger.clone()),
        "samba",
        logger.clone(),
    );

    assert!(collector.describe().await.is_empty(), "F041 FALSIFIED: descriptors without data");
    assert!(!collector.is_described());
    assert!(collector.collect().await.is_empty(), "F041 FALSIFIED: samples without data");
    assert!(logger.error_count() >= 2, "F041 FALSIFIED: failures not logged");
}

/// F042: A failing cycle emits nothing, and the next one recovers
#[tokio::test]
async fn f042_collect_failure_is_one_cycle() {
    let (mut collector, daemon, _logger) = collector(Script::default());
    collector.describe().await;

    daemon.commands().update(|script| script.failing = Some("-p"));
    assert!(collector.collect().await.is_empty(), "F042 FALSIFIED: stale or partial samples emitted");

    daemon.commands().update(|script| script.failing = None);
    assert_eq!(collector.collect().await.len(), CATALOG.len(), "F042 FALSIFIED: no recovery");
    daemon.stop().await.unwrap();
}

/// F043: Collect before any describe logs each name and emits nothing
#[tokio::test]
async fn f043_collect_without_descriptor() {
    let (mut collector, daemon, logger) = collector(Script::default());

    assert!(collector.collect().await.is_empty());
    let errors = logger.errors();
    assert_eq!(errors.len(), CATALOG.len(), "F043 FALSIFIED: missing descriptors not logged");
    assert!(errors.iter().all(|e| e.starts_with("No description found for ")));
    daemon.stop().await.unwrap();
}

/// F044: The registry only grows
#[tokio::test]
async fn f044_registry_append_only() {
    let (mut collector, daemon, _logger) = collector(Script::default());
    collector.describe().await;
    let before: Vec<String> = collector.descriptor_names().map(String::from).collect();

    daemon.commands().update(|script| script.failing = Some("-L"));
    collector.describe().await;
    daemon.commands().update(|script| {
        script.failing = None;
        script.locks = fixtures::NO_LOCKS.to_string();
    });
    collector.describe().await;

    let after: Vec<String> = collector.descriptor_names().map(String::from).collect();
    assert_eq!(before, after, "F044 FALSIFIED: registry changed");
    daemon.stop().await.unwrap();
}

/// F045: Skipped report lines reach the logger, the rest is still exported
#[tokio::test]
async fn f045_parse_skips_are_logged() {
    let script = Script {
        locks: fixtures::with_rows(
            fixtures::LOCKS,
            &[
                "1121  1000  DENY_NONE  0x120089  RDONLY  NONE  /srv/data  a.txt  Sun May 16 14:08:11 2021",
                "11x1  1000  DENY_NONE  0x120089  RDONLY  NONE  /srv/data  b.txt  Sun May 16 14:08:11 2021",
            ],
        ),
        ..Script::default()
    };
    let (mut collector, daemon, logger) = collector(script);
    collector.describe().await;
    logger.clear();

    let families = collector.collect().await;
    assert_eq!(value(&families, "samba_locked_file_count"), Some(1.0), "F045 FALSIFIED");
    let errors = logger.errors();
    assert_eq!(errors.len(), 1);
    assert!(
        errors[0].starts_with("while getting LockData line 5"),
        "F045 FALSIFIED: diagnostic lacks line context: {}",
        errors[0]
    );
    daemon.stop().await.unwrap();
}

/// F046: A scrape describes lazily when startup found no daemon
#[tokio::test]
async fn f046_scrape_describes_lazily() {
    let (mut collector, daemon, _logger) = collector(Script::default());
    assert!(!collector.is_described());

    let body = String::from_utf8(scrape(&mut collector).await.unwrap()).unwrap();
    assert!(collector.is_described(), "F046 FALSIFIED: scrape did not describe");
    assert!(body.contains("# HELP samba_client_count "));
    assert!(body.contains("samba_client_count 3"), "F046 FALSIFIED: body was {body}");
    daemon.stop().await.unwrap();
}
