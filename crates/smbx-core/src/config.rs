//! Configuration shared by the status daemon and the exporter.
//!
//! Configuration is validated at load time, with sensible defaults and clear
//! error messages. Every field has a serde default, so an empty file is valid.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SmbxError};

/// Default path of the request pipe (exporter → daemon).
pub const DEFAULT_REQUEST_PIPE: &str = "/run/samba_exporter.request.pipe";

/// Default path of the response pipe (daemon → exporter).
pub const DEFAULT_RESPONSE_PIPE: &str = "/run/samba_exporter.response.pipe";

/// Default upper bound for one protocol frame body.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Named pipe pair both processes must agree on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeConfig {
    /// Pipe carrying requests to the daemon.
    #[serde(default = "default_request_pipe")]
    pub request_pipe: PathBuf,

    /// Pipe carrying responses back to the exporter.
    #[serde(default = "default_response_pipe")]
    pub response_pipe: PathBuf,

    /// Largest accepted frame body in bytes.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

fn default_request_pipe() -> PathBuf {
    PathBuf::from(DEFAULT_REQUEST_PIPE)
}

fn default_response_pipe() -> PathBuf {
    PathBuf::from(DEFAULT_RESPONSE_PIPE)
}

fn default_max_frame_bytes() -> usize {
    DEFAULT_MAX_FRAME_BYTES
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            request_pipe: default_request_pipe(),
            response_pipe: default_response_pipe(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl PipeConfig {
    /// Validates the pipe pair.
    ///
    /// # Errors
    /// Returns an error if a path is empty, both paths are equal, or the frame
    /// limit is zero.
    pub fn validate(&self) -> Result<()> {
        if self.request_pipe.as_os_str().is_empty() {
            return Err(SmbxError::config("request_pipe cannot be empty"));
        }
        if self.response_pipe.as_os_str().is_empty() {
            return Err(SmbxError::config("response_pipe cannot be empty"));
        }
        if self.request_pipe == self.response_pipe {
            return Err(SmbxError::config(
                "request_pipe and response_pipe must be different files",
            ));
        }
        if self.max_frame_bytes == 0 {
            return Err(SmbxError::config("max_frame_bytes must be greater than 0"));
        }
        Ok(())
    }
}

/// Reads and deserializes a TOML configuration file.
///
/// Validation is left to the caller, since each binary owns its config type.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_toml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = std::fs::read_to_string(path.as_ref())
        .map_err(|e| SmbxError::config(format!("failed to read config: {e}")))?;
    toml::from_str(&content)
        .map_err(|e| SmbxError::serialization(format!("failed to parse config: {e}")))
}

/// Serde helper for humantime durations.
pub mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Serializes a duration as a human-readable string.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    /// Deserializes a duration from a human-readable string.
    ///
    /// # Errors
    /// Returns an error if the string cannot be parsed.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
