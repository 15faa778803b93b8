//! Status daemon configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use smbx_core::config::humantime_serde;
use smbx_core::{PipeConfig, load_toml};

use crate::error::{Result, StatusdError};

/// Status daemon configuration.
///
/// ```toml
/// smbstatus_path = "/usr/bin/smbstatus"
/// command_timeout = "10s"
///
/// [pipes]
/// request_pipe = "/run/samba_exporter.request.pipe"
/// response_pipe = "/run/samba_exporter.response.pipe"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusdConfig {
    /// Pipe pair shared with the exporter.
    #[serde(default)]
    pub pipes: PipeConfig,

    /// `smbstatus` executable.
    #[serde(default = "default_smbstatus_path")]
    pub smbstatus_path: PathBuf,

    /// `ps` executable.
    #[serde(default = "default_ps_path")]
    pub ps_path: PathBuf,

    /// Command name of the worker processes to report on.
    #[serde(default = "default_process_name")]
    pub process_name: String,

    /// Limit for each command run.
    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    pub command_timeout: Duration,
}

fn default_smbstatus_path() -> PathBuf {
    PathBuf::from("smbstatus")
}

fn default_ps_path() -> PathBuf {
    PathBuf::from("ps")
}

fn default_process_name() -> String {
    "smbd".to_string()
}

/// Commands run for a [`Dataset::All`](smbx_pipe::Dataset::All) request, one after another.
pub const COMMANDS_PER_REQUEST: u32 = 4;

const fn default_command_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for StatusdConfig {
    fn default() -> Self {
        Self {
            pipes: PipeConfig::default(),
            smbstatus_path: default_smbstatus_path(),
            ps_path: default_ps_path(),
            process_name: default_process_name(),
            command_timeout: default_command_timeout(),
        }
    }
}

impl StatusdConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = load_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Longest time one request can keep the daemon busy.
    ///
    /// A requester has to wait longer than this to be sure that a slow command
    /// shows up as a failed response rather than as its own timeout.
    #[must_use]
    pub fn request_budget(&self) -> Duration {
        self.command_timeout.saturating_mul(COMMANDS_PER_REQUEST)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns an error describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.pipes.validate()?;
        if self.smbstatus_path.as_os_str().is_empty() {
            return Err(StatusdError::config("smbstatus_path cannot be empty"));
        }
        if self.ps_path.as_os_str().is_empty() {
            return Err(StatusdError::config("ps_path cannot be empty"));
        }
        if self.process_name.trim().is_empty() {
            return Err(StatusdError::config("process_name cannot be empty"));
        }
        if self.command_timeout.is_zero() {
            return Err(StatusdError::config("command_timeout must be greater than 0"));
        }
        Ok(())
    }
}
