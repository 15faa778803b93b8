//! External command execution.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Result, StatusdError};

/// Runs an external program and returns its standard output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args`.
    ///
    /// # Errors
    /// Returns an error if the program cannot start, exits unsuccessfully or
    /// runs too long.
    async fn run(&self, program: &Path, args: &[&str]) -> Result<String>;
}

/// Runs commands as child processes, killing any that outlive the timeout.
#[derive(Debug, Clone)]
pub struct SystemCommandRunner {
    timeout: Duration,
}

impl SystemCommandRunner {
    /// Creates a runner with the given per-command limit.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &Path, args: &[&str]) -> Result<String> {
        let command_line = command_line(program, args);
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(command = %command_line, "running");
        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| StatusdError::CommandTimeout {
                command: command_line.clone(),
                timeout: self.timeout,
            })?
            .map_err(|source| StatusdError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StatusdError::command(
                command_line,
                format!("{}: {}", output.status, stderr.trim()),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Formats a program and its arguments for logs and errors.
#[must_use]
pub fn command_line(program: &Path, args: &[&str]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
