//! In-memory daemon harness.
//!
//! Runs a real [`StatusDaemon`] behind a real [`PipeServer`], with memory
//! pipes instead of FIFOs and scripted command output instead of
//! `smbstatus`. Tests get the requester side of the pair.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use smbx_pipe::{MemoryPipe, PipeResult, PipeServer, StatusClient, memory_pipe};
use smbx_statusd::daemon::{LOCKS_FLAG, PROCESSES_FLAG, SHARES_FLAG};
use smbx_statusd::{CommandRunner, RequestMetrics, StatusDaemon, StatusdConfig, StatusdError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{Result, TestError};
use crate::fixtures;

/// Bytes buffered by each memory pipe, and the frame limit.
const PIPE_CAPACITY: usize = 1024 * 1024;

/// Command output served to the daemon.
#[derive(Debug, Clone)]
pub struct Script {
    /// `smbstatus -L` output.
    pub locks: String,
    /// `smbstatus -S` output.
    pub shares: String,
    /// `smbstatus -p` output.
    pub processes: String,
    /// `ps` output.
    pub ps: String,
    /// Flag whose command exits with an error, e.g. `"-S"`.
    pub failing: Option<&'static str>,
    /// Delay applied once, to the next command run.
    pub delay_next: Option<Duration>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            locks: fixtures::LOCKS.to_string(),
            shares: fixtures::SHARES.to_string(),
            processes: fixtures::PROCESSES.to_string(),
            ps: fixtures::PS.to_string(),
            failing: None,
            delay_next: None,
        }
    }
}

/// [`CommandRunner`] answering from a [`Script`].
///
/// Clones share the script, so a test can change the output while the
/// daemon is running.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCommands {
    script: Arc<Mutex<Script>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedCommands {
    /// Creates a runner over `script`.
    #[must_use]
    pub fn new(script: Script) -> Self {
        Self {
            script: Arc::new(Mutex::new(script)),
            calls: Arc::default(),
        }
    }

    /// Changes the script in place.
    pub fn update(&self, change: impl FnOnce(&mut Script)) {
        change(&mut self.script.lock());
    }

    /// Command lines run so far.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedCommands {
    async fn run(&self, program: &Path, args: &[&str]) -> smbx_statusd::Result<String> {
        let line = smbx_statusd::command::command_line(program, args);
        self.calls.lock().push(line.clone());

        let (delay, failing, output) = {
            let mut script = self.script.lock();
            let output = match args.first().copied() {
                Some(LOCKS_FLAG) => script.locks.clone(),
                Some(SHARES_FLAG) => script.shares.clone(),
                Some(PROCESSES_FLAG) => script.processes.clone(),
                _ => script.ps.clone(),
            };
            let failing = script.failing.is_some_and(|flag| args.contains(&flag));
            (script.delay_next.take(), failing, output)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if failing {
            return Err(StatusdError::command(line, "exit status: 1"));
        }
        Ok(output)
    }
}

/// Builder for a running in-memory daemon.
#[derive(Debug)]
pub struct StatusHarness {
    commands: ScriptedCommands,
    timeout: Duration,
}

impl Default for StatusHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusHarness {
    /// Harness serving the stock fixtures, with a 5 second client timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: ScriptedCommands::default(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Serves `script` instead of the stock fixtures.
    #[must_use]
    pub fn with_script(mut self, script: Script) -> Self {
        self.commands = ScriptedCommands::new(script);
        self
    }

    /// Sets the client's response timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Spawns the daemon and returns the client talking to it.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(self) -> (StatusClient<MemoryPipe, MemoryPipe>, DaemonHandle) {
        let (client_out, server_in) = memory_pipe("request", PIPE_CAPACITY, PIPE_CAPACITY);
        let (server_out, client_in) = memory_pipe("response", PIPE_CAPACITY, PIPE_CAPACITY);

        let daemon = StatusDaemon::new(StatusdConfig::default(), self.commands.clone());
        let metrics = daemon.metrics().clone();
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut server = PipeServer::new(server_in, server_out);
            server.serve(&daemon, shutdown_rx).await
        });

        let client = StatusClient::new(client_out, client_in, self.timeout);
        let handle = DaemonHandle {
            commands: self.commands,
            metrics,
            shutdown,
            task,
        };
        (client, handle)
    }
}

/// Control over a daemon started by [`StatusHarness::start`].
#[derive(Debug)]
pub struct DaemonHandle {
    commands: ScriptedCommands,
    metrics: RequestMetrics,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<PipeResult<()>>,
}

impl DaemonHandle {
    /// The scripted command runner the daemon uses.
    #[must_use]
    pub const fn commands(&self) -> &ScriptedCommands {
        &self.commands
    }

    /// The daemon's request metrics.
    #[must_use]
    pub const fn metrics(&self) -> &RequestMetrics {
        &self.metrics
    }

    /// Stops the daemon and waits for its serve loop to end.
    ///
    /// # Errors
    /// Returns an error if the loop failed or its task panicked.
    pub async fn stop(self) -> Result<()> {
        let _ = self.shutdown.send(true);
        self.task
            .await
            .map_err(|e| TestError::harness(format!("daemon task failed: {e}")))??;
        Ok(())
    }
}
