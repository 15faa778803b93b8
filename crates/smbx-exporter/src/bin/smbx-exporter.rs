//! smbx-exporter - Prometheus endpoint for Samba status.
//!
//! Talks to `smbx-statusd` over its FIFO pair and serves the metrics over
//! HTTP until SIGINT or SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::{Mutex, watch};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use smbx_core::{StatusLogger, TracingLogger};
use smbx_exporter::{ExporterConfig, MetricsServer, PipeSnapshotSource, SambaCollector};
use smbx_pipe::{FifoPipe, StatusClient};

/// Samba Prometheus exporter.
#[derive(Parser)]
#[command(name = "smbx-exporter", about = "Exports Samba status as Prometheus metrics", version)]
struct Args {
    /// Configuration file (TOML).
    #[arg(short, long, env = "SMBX_EXPORTER_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Request pipe path, overrides the configuration file.
    #[arg(long, value_name = "PATH")]
    request_pipe: Option<PathBuf>,

    /// Response pipe path, overrides the configuration file.
    #[arg(long, value_name = "PATH")]
    response_pipe: Option<PathBuf>,

    /// HTTP listen address, overrides the configuration file.
    #[arg(short, long, value_name = "ADDR")]
    listen_address: Option<String>,

    /// Add a `machine` label with the host name to every metric.
    #[arg(long)]
    machine_label: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level.as_str())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("cannot install logger: {e}"))
}

fn load_config(args: &Args) -> anyhow::Result<ExporterConfig> {
    let mut config = match &args.config {
        Some(path) => ExporterConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ExporterConfig::default(),
    };
    if let Some(path) = &args.request_pipe {
        config.pipes.request_pipe.clone_from(path);
    }
    if let Some(path) = &args.response_pipe {
        config.pipes.response_pipe.clone_from(path);
    }
    if let Some(addr) = &args.listen_address {
        config.listen_address.clone_from(addr);
    }
    config.machine_label |= args.machine_label;
    config.validate()?;
    Ok(config)
}

async fn wait_for_shutdown() {
    let ctrl_c = tokio::signal::ctrl_c();
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = ctrl_c => {}
                _ = term.recv() => {}
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "cannot listen for SIGTERM");
            let _ = ctrl_c.await;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;
    let config = load_config(&args)?;

    let logger: Arc<dyn StatusLogger> = Arc::new(TracingLogger);
    let max = config.pipes.max_frame_bytes;
    let client = StatusClient::new(
        FifoPipe::writer(&config.pipes.request_pipe, max),
        FifoPipe::reader(&config.pipes.response_pipe, max),
        config.response_timeout,
    );
    let mut collector = SambaCollector::new(
        PipeSnapshotSource::new(client, Arc::clone(&logger)),
        config.namespace.clone(),
        logger,
    );
    if config.machine_label {
        let host = hostname::get().context("reading host name")?;
        collector = collector.with_machine_label(host.to_string_lossy());
    }

    // A daemon that is not up yet is retried on the first scrape.
    let described = collector.describe().await.len();
    tracing::info!(descriptors = described, "initial describe done");

    let server = MetricsServer::bind(config.socket_addr()?, config.metrics_path.clone())?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_shutdown().await;
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    tracing::info!(
        listen = %config.listen_address,
        path = %config.metrics_path,
        request_pipe = %config.pipes.request_pipe.display(),
        "smbx-exporter started"
    );
    server
        .serve(Arc::new(Mutex::new(collector)), shutdown_rx)
        .await
        .context("serving metrics")
}
