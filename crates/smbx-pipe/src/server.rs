//! Responder side of the pipe pair.
//!
//! The server handles one exchange at a time: read a request, let the
//! [`RequestHandler`] build the answer, write it, repeat.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::{PipeError, PipeResult};
use crate::frame;
use crate::handler::PipeHandler;
use crate::protocol::{StatusRequest, StatusResponse};

/// Pause after a failed exchange before reading again.
const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Builds the response for one request.
///
/// Failures are reported inside the response, never as an error.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Handles one request.
    async fn handle(&self, request: &StatusRequest) -> StatusResponse;
}

/// Outcome of one [`PipeServer::serve_one`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    /// Response written.
    Answered,
    /// Request could not be decoded and was dropped.
    DroppedRequest,
    /// Nobody was listening for the response.
    DroppedResponse,
}

/// Serves requests read from one pipe and answers on another.
#[derive(Debug)]
pub struct PipeServer<Q, R> {
    requests: Q,
    responses: R,
}

impl<Q: PipeHandler, R: PipeHandler> PipeServer<Q, R> {
    /// Creates a server reading `requests` and writing `responses`.
    #[must_use]
    pub const fn new(requests: Q, responses: R) -> Self {
        Self {
            requests,
            responses,
        }
    }

    /// Services exactly one exchange.
    ///
    /// The response handle is opened for the write and closed right after.
    ///
    /// # Errors
    /// Returns an error if the request pipe cannot be opened or read, or the
    /// response cannot be encoded or written.
    pub async fn serve_one<H>(&mut self, handler: &H) -> PipeResult<Exchange>
    where
        H: RequestHandler + ?Sized,
    {
        self.requests.open().await?;
        let body = self.requests.read_frame(None).await?;
        let request: StatusRequest = match frame::from_body(&body) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(pipe = %self.requests.name(), error = %err, "dropping undecodable request");
                return Ok(Exchange::DroppedRequest);
            }
        };

        tracing::debug!(request_id = %request.id, dataset = %request.dataset, "handling request");
        let response = handler.handle(&request).await;
        let body = frame::to_body(&response)?;

        if let Err(err) = self.responses.open().await {
            tracing::warn!(request_id = %request.id, error = %err, "no requester listening, response dropped");
            return Ok(Exchange::DroppedResponse);
        }
        let written = self.responses.write_frame(&body).await;
        self.responses.close().await;
        written?;

        tracing::debug!(request_id = %request.id, success = response.success, "response sent");
        Ok(Exchange::Answered)
    }

    /// Serves exchanges until `shutdown` turns true or its sender is dropped.
    ///
    /// Recoverable failures are logged and the loop continues.
    ///
    /// # Errors
    /// Returns the first unrecoverable error, such as a request pipe that
    /// cannot be opened.
    pub async fn serve<H>(&mut self, handler: &H, mut shutdown: watch::Receiver<bool>) -> PipeResult<()>
    where
        H: RequestHandler + ?Sized,
    {
        tracing::info!(requests = %self.requests.name(), responses = %self.responses.name(), "serving");
        while !*shutdown.borrow() {
            let result = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                result = self.serve_one(handler) => result,
            };

            match result {
                Ok(_) => {}
                Err(err) if is_transient(&err) => {
                    tracing::warn!(error = %err, "exchange failed");
                    if err.poisons_stream() {
                        self.requests.close().await;
                    }
                    tokio::select! {
                        changed = shutdown.changed() => {
                            if changed.is_err() {
                                break;
                            }
                        }
                        () = tokio::time::sleep(RETRY_DELAY) => {}
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "serving stopped");
                    return Err(err);
                }
            }
        }
        tracing::info!("shutdown requested, serving stopped");
        Ok(())
    }
}

fn is_transient(err: &PipeError) -> bool {
    err.is_recoverable() || matches!(err, PipeError::Io(_))
}
