//! The status daemon: answers pipe requests by running the status commands.

use std::time::Instant;

use async_trait::async_trait;
use smbx_core::PsRecord;
use smbx_pipe::{Dataset, RequestHandler, StatusPayload, StatusRequest, StatusResponse};

use crate::command::CommandRunner;
use crate::config::StatusdConfig;
use crate::error::Result;
use crate::metrics::RequestMetrics;
use crate::ps::{PS_ARGS, parse_ps};

/// `smbstatus` flag for the locked files report.
pub const LOCKS_FLAG: &str = "-L";
/// `smbstatus` flag for the shares report.
pub const SHARES_FLAG: &str = "-S";
/// `smbstatus` flag for the processes report.
pub const PROCESSES_FLAG: &str = "-p";
/// `smbstatus` flag for numeric user and group ids.
pub const NUMERIC_FLAG: &str = "-n";

/// Runs the status commands a request asks for.
///
/// Each report comes from its own command run, so the reports in one
/// response are not a consistent snapshot of the server.
#[derive(Debug)]
pub struct StatusDaemon<C> {
    config: StatusdConfig,
    runner: C,
    metrics: RequestMetrics,
}

impl<C: CommandRunner> StatusDaemon<C> {
    /// Creates a daemon running commands through `runner`.
    #[must_use]
    pub fn new(config: StatusdConfig, runner: C) -> Self {
        Self {
            config,
            runner,
            metrics: RequestMetrics::new(),
        }
    }

    /// Returns the request metrics.
    #[must_use]
    pub const fn metrics(&self) -> &RequestMetrics {
        &self.metrics
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &StatusdConfig {
        &self.config
    }

    /// Gathers the data sets selected by `dataset`.
    ///
    /// # Errors
    /// Returns the first command failure; partial results are discarded.
    pub async fn collect(&self, dataset: Dataset) -> Result<StatusPayload> {
        let mut payload = StatusPayload::default();
        if dataset.includes(Dataset::Locks) {
            payload.locks = Some(self.smbstatus(LOCKS_FLAG).await?);
        }
        if dataset.includes(Dataset::Shares) {
            payload.shares = Some(self.smbstatus(SHARES_FLAG).await?);
        }
        if dataset.includes(Dataset::Processes) {
            payload.processes = Some(self.smbstatus(PROCESSES_FLAG).await?);
        }
        if dataset.includes(Dataset::PsData) {
            payload.ps_data = Some(self.ps_data().await?);
        }
        Ok(payload)
    }

    async fn smbstatus(&self, report: &str) -> Result<String> {
        self.runner
            .run(&self.config.smbstatus_path, &[report, NUMERIC_FLAG])
            .await
    }

    async fn ps_data(&self) -> Result<Vec<PsRecord>> {
        let output = self.runner.run(&self.config.ps_path, &PS_ARGS).await?;
        Ok(parse_ps(&output, &self.config.process_name))
    }
}

#[async_trait]
impl<C: CommandRunner> RequestHandler for StatusDaemon<C> {
    async fn handle(&self, request: &StatusRequest) -> StatusResponse {
        let start = Instant::now();
        self.metrics.record_request();

        let response = match self.collect(request.dataset).await {
            Ok(payload) => StatusResponse::success(request.id, payload),
            Err(err) => {
                self.metrics.record_error();
                tracing::error!(request_id = %request.id, dataset = %request.dataset, error = %err, "status request failed");
                StatusResponse::failure(request.id, err.to_string())
            }
        };

        self.metrics.record_duration(start.elapsed());
        response
    }
}
