//! Exporter configuration.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use smbx_core::config::humantime_serde;
use smbx_core::{PipeConfig, load_toml};

use crate::error::{ExporterError, Result};

/// Exporter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Pipe pair shared with the daemon.
    #[serde(default)]
    pub pipes: PipeConfig,

    /// How long to wait for the daemon's answer.
    ///
    /// Keep it above the daemon's `command_timeout` times four, the number of
    /// commands a full request runs, or a slow command surfaces here as a
    /// timeout instead of as the daemon's error.
    #[serde(default = "default_response_timeout", with = "humantime_serde")]
    pub response_timeout: Duration,

    /// HTTP listen address.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Path serving the metrics.
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,

    /// Prefix of every metric name.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Adds a constant `machine` label with the host name.
    #[serde(default)]
    pub machine_label: bool,
}

const fn default_response_timeout() -> Duration {
    Duration::from_secs(45)
}

fn default_listen_address() -> String {
    "0.0.0.0:9922".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_namespace() -> String {
    "samba".to_string()
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            pipes: PipeConfig::default(),
            response_timeout: default_response_timeout(),
            listen_address: default_listen_address(),
            metrics_path: default_metrics_path(),
            namespace: default_namespace(),
            machine_label: false,
        }
    }
}

impl ExporterConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = load_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns an error describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.pipes.validate()?;
        if self.response_timeout.is_zero() {
            return Err(ExporterError::config("response_timeout must be greater than 0"));
        }
        self.socket_addr()?;
        if !self.metrics_path.starts_with('/') {
            return Err(ExporterError::config("metrics_path must start with '/'"));
        }
        if !is_metric_name(&self.namespace) {
            return Err(ExporterError::config(format!(
                "namespace {:?} is not a valid metric name prefix",
                self.namespace
            )));
        }
        Ok(())
    }

    /// Parses the listen address.
    ///
    /// # Errors
    /// Returns an error if it is not `host:port`.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_address.parse().map_err(|e| {
            ExporterError::config(format!(
                "listen_address {:?} is invalid: {e}",
                self.listen_address
            ))
        })
    }
}

fn is_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
