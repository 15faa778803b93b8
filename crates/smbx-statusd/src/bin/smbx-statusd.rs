//! smbx-statusd - answers status requests from the exporter.
//!
//! Creates the request and response FIFOs, then serves requests until
//! SIGINT or SIGTERM.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use smbx_pipe::{FifoPipe, PipeServer};
use smbx_statusd::{StatusDaemon, StatusdConfig, SystemCommandRunner};

/// Samba status daemon.
#[derive(Parser)]
#[command(name = "smbx-statusd", about = "Runs smbstatus for the smbx exporter", version)]
struct Args {
    /// Configuration file (TOML).
    #[arg(short, long, env = "SMBX_STATUSD_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Request pipe path, overrides the configuration file.
    #[arg(long, value_name = "PATH")]
    request_pipe: Option<PathBuf>,

    /// Response pipe path, overrides the configuration file.
    #[arg(long, value_name = "PATH")]
    response_pipe: Option<PathBuf>,

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

fn load_config(args: &Args) -> anyhow::Result<StatusdConfig> {
    let mut config = match &args.config {
        Some(path) => StatusdConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => StatusdConfig::default(),
    };
    if let Some(path) = &args.request_pipe {
        config.pipes.request_pipe.clone_from(path);
    }
    if let Some(path) = &args.response_pipe {
        config.pipes.response_pipe.clone_from(path);
    }
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

    // Without both pipes there is nothing to serve.
    FifoPipe::create(&config.pipes.request_pipe).context("creating request pipe")?;
    FifoPipe::create(&config.pipes.response_pipe).context("creating response pipe")?;

    let max = config.pipes.max_frame_bytes;
    let mut server = PipeServer::new(
        FifoPipe::reader(&config.pipes.request_pipe, max),
        FifoPipe::writer(&config.pipes.response_pipe, max),
    );
    let daemon = StatusDaemon::new(
        config.clone(),
        SystemCommandRunner::new(config.command_timeout),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_shutdown().await;
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    tracing::info!(
        smbstatus = %config.smbstatus_path.display(),
        process_name = %config.process_name,
        request_budget = ?config.request_budget(),
        "smbx-statusd started"
    );
    let served = server.serve(&daemon, shutdown_rx).await;

    let stats = daemon.metrics().snapshot();
    tracing::info!(
        requests = stats.requests_total,
        errors = stats.errors_total,
        avg_us = stats.duration_avg_us,
        max_us = stats.duration_max_us,
        uptime_secs = stats.uptime_secs,
        "smbx-statusd stopped"
    );
    served.context("serving requests")
}
