//! Requester side of the pipe pair.

use std::time::Duration;

use tokio::time::Instant;

use crate::error::{PipeError, PipeResult};
use crate::frame;
use crate::handler::PipeHandler;
use crate::protocol::{Dataset, StatusPayload, StatusRequest, StatusResponse};

/// Sends status requests and waits for the matching response.
///
/// At most one exchange runs at a time, which `&mut self` enforces.
#[derive(Debug)]
pub struct StatusClient<Q, R> {
    requests: Q,
    responses: R,
    timeout: Duration,
}

impl<Q: PipeHandler, R: PipeHandler> StatusClient<Q, R> {
    /// Creates a client writing to `requests` and reading from `responses`.
    #[must_use]
    pub const fn new(requests: Q, responses: R, timeout: Duration) -> Self {
        Self {
            requests,
            responses,
            timeout,
        }
    }

    /// Returns the response deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs one exchange and returns the response answering it.
    ///
    /// Frames answering an earlier, abandoned request are skipped. On a
    /// timeout or a framing error the response handle is closed, so the next
    /// exchange starts from a fresh stream.
    ///
    /// # Errors
    /// Returns [`PipeError::Connection`] if a pipe cannot be opened,
    /// [`PipeError::Timeout`] if no matching response arrives in time, or
    /// [`PipeError::Protocol`] for an undecodable response.
    pub async fn send(&mut self, dataset: Dataset) -> PipeResult<StatusResponse> {
        let request = StatusRequest::new(dataset);
        let body = frame::to_body(&request)?;

        // Listen before asking, so the responder always finds a reader.
        self.responses.open().await?;

        self.requests.open().await?;
        let written = self.requests.write_frame(&body).await;
        self.requests.close().await;
        written?;
        tracing::debug!(request_id = %request.id, dataset = %dataset, "request sent");

        let deadline = Instant::now() + self.timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                self.responses.close().await;
                return Err(PipeError::Timeout(self.timeout));
            }

            let body = match self.responses.read_frame(Some(remaining)).await {
                Ok(body) => body,
                Err(PipeError::Timeout(_)) => {
                    self.responses.close().await;
                    return Err(PipeError::Timeout(self.timeout));
                }
                Err(err) => {
                    if err.poisons_stream() {
                        self.responses.close().await;
                    }
                    return Err(err);
                }
            };

            let response: StatusResponse = match frame::from_body(&body) {
                Ok(response) => response,
                Err(err) => {
                    self.responses.close().await;
                    return Err(err);
                }
            };

            if response.request_id != request.id {
                tracing::warn!(
                    request_id = %request.id,
                    stale_id = %response.request_id,
                    "discarding stale response"
                );
                continue;
            }
            return Ok(response);
        }
    }

    /// Runs one exchange and returns the payload.
    ///
    /// # Errors
    /// As [`Self::send`], plus [`PipeError::Upstream`] when the daemon reports
    /// a failed command and [`PipeError::Protocol`] when a selected data set
    /// is missing.
    pub async fn fetch(&mut self, dataset: Dataset) -> PipeResult<StatusPayload> {
        self.send(dataset).await?.into_payload(dataset)
    }
}
