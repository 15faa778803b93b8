//! Where the collector gets its data from.

use std::sync::Arc;

use async_trait::async_trait;
use smbx_core::{StatusLogger, StatusSnapshot, parse_locks, parse_processes, parse_shares};
use smbx_pipe::{Dataset, PipeHandler, StatusClient, StatusPayload};

use crate::error::Result;

/// Produces one parsed snapshot per call.
#[async_trait]
pub trait SnapshotSource: Send {
    /// Fetches and parses a fresh snapshot.
    async fn fetch(&mut self) -> Result<StatusSnapshot>;
}

/// Snapshot source asking the status daemon over the pipe pair.
pub struct PipeSnapshotSource<Q, R> {
    client: StatusClient<Q, R>,
    logger: Arc<dyn StatusLogger>,
}

impl<Q: PipeHandler, R: PipeHandler> PipeSnapshotSource<Q, R> {
    /// Creates a source over `client`; skipped report lines go to `logger`.
    #[must_use]
    pub fn new(client: StatusClient<Q, R>, logger: Arc<dyn StatusLogger>) -> Self {
        Self { client, logger }
    }
}

#[async_trait]
impl<Q: PipeHandler, R: PipeHandler> SnapshotSource for PipeSnapshotSource<Q, R> {
    async fn fetch(&mut self) -> Result<StatusSnapshot> {
        let payload = self.client.fetch(Dataset::All).await?;
        Ok(snapshot_from_payload(&payload, self.logger.as_ref()))
    }
}

impl<Q: std::fmt::Debug, R: std::fmt::Debug> std::fmt::Debug for PipeSnapshotSource<Q, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeSnapshotSource")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

/// Parses the raw reports of a payload. Missing reports parse as empty.
#[must_use]
pub fn snapshot_from_payload(payload: &StatusPayload, logger: &dyn StatusLogger) -> StatusSnapshot {
    StatusSnapshot {
        locks: parse_locks(payload.locks.as_deref().unwrap_or_default(), logger),
        shares: parse_shares(payload.shares.as_deref().unwrap_or_default(), logger),
        processes: parse_processes(payload.processes.as_deref().unwrap_or_default(), logger),
        ps_data: payload.ps_data.clone().unwrap_or_default(),
    }
}
