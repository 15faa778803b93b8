//! Request and response messages exchanged over the pipe pair.

use std::fmt;

use serde::{Deserialize, Serialize};
use smbx_core::PsRecord;
use uuid::Uuid;

use crate::error::{PipeError, PipeResult};

/// Data set a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dataset {
    /// `smbstatus -L` report.
    Locks,
    /// `smbstatus -S` report.
    Shares,
    /// `smbstatus -p` report.
    Processes,
    /// Resource usage of the worker processes.
    PsData,
    /// Everything above.
    All,
}

impl Dataset {
    /// Returns true if `self` selects `other`.
    #[must_use]
    pub fn includes(self, other: Self) -> bool {
        self == Self::All || self == other
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Locks => "locks",
            Self::Shares => "shares",
            Self::Processes => "processes",
            Self::PsData => "ps-data",
            Self::All => "all",
        };
        f.write_str(name)
    }
}

/// Request sent by the exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRequest {
    /// Correlation id echoed by the response.
    pub id: Uuid,
    /// Selected data.
    pub dataset: Dataset,
}

impl StatusRequest {
    /// Creates a request with a fresh id.
    #[must_use]
    pub fn new(dataset: Dataset) -> Self {
        Self {
            id: Uuid::new_v4(),
            dataset,
        }
    }
}

/// Raw data carried by a response.
///
/// The three reports travel as the text `smbstatus` printed; parsing happens
/// on the exporter side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusPayload {
    /// Locked files report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locks: Option<String>,
    /// Shares report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<String>,
    /// Processes report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processes: Option<String>,
    /// Worker process list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ps_data: Option<Vec<PsRecord>>,
}

impl StatusPayload {
    /// Returns true if the payload holds `dataset`.
    #[must_use]
    pub fn has(&self, dataset: Dataset) -> bool {
        match dataset {
            Dataset::Locks => self.locks.is_some(),
            Dataset::Shares => self.shares.is_some(),
            Dataset::Processes => self.processes.is_some(),
            Dataset::PsData => self.ps_data.is_some(),
            Dataset::All => [
                Dataset::Locks,
                Dataset::Shares,
                Dataset::Processes,
                Dataset::PsData,
            ]
            .into_iter()
            .all(|d| self.has(d)),
        }
    }
}

/// Response sent by the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Id of the request this answers.
    pub request_id: Uuid,
    /// False if a status command failed.
    pub success: bool,
    /// Data, empty on failure.
    #[serde(default)]
    pub payload: StatusPayload,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusResponse {
    /// Creates a successful response.
    #[must_use]
    pub fn success(request_id: Uuid, payload: StatusPayload) -> Self {
        Self {
            request_id,
            success: true,
            payload,
            error: None,
        }
    }

    /// Creates a failed response.
    #[must_use]
    pub fn failure(request_id: Uuid, error: impl Into<String>) -> Self {
        Self {
            request_id,
            success: false,
            payload: StatusPayload::default(),
            error: Some(error.into()),
        }
    }

    /// Turns the response into the payload for `dataset`.
    ///
    /// # Errors
    /// Returns [`PipeError::Upstream`] for a failed response and
    /// [`PipeError::Protocol`] if a selected data set is missing.
    pub fn into_payload(self, dataset: Dataset) -> PipeResult<StatusPayload> {
        if !self.success {
            return Err(PipeError::upstream(
                self.error
                    .unwrap_or_else(|| "daemon reported failure without detail".to_string()),
            ));
        }
        if !self.payload.has(dataset) {
            return Err(PipeError::protocol(format!(
                "unexpected response: payload lacks dataset {dataset}"
            )));
        }
        Ok(self.payload)
    }
}
