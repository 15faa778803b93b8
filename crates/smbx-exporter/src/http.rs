//! Metrics endpoint.
//!
//! `tiny_http` is blocking, so the accept loop runs on a blocking thread and
//! enters the runtime for each scrape. Scrapes are serialized by the mutex
//! around the collector.

use std::net::SocketAddr;
use std::sync::Arc;

use prometheus::{Encoder, TextEncoder};
use tiny_http::{Header, Request, Response, Server};
use tokio::runtime::Handle;
use tokio::sync::{Mutex, watch};

use crate::collector::SambaCollector;
use crate::error::{ExporterError, Result};
use crate::snapshot::SnapshotSource;

/// Collector shared between the endpoint and its owner.
pub type SharedCollector<S> = Arc<Mutex<SambaCollector<S>>>;

/// Runs one scrape and returns the encoded body.
///
/// If no descriptor is registered yet, for instance because the daemon was
/// down at startup, `describe` runs first.
///
/// # Errors
/// Returns an error if the families cannot be encoded.
pub async fn scrape<S: SnapshotSource>(collector: &mut SambaCollector<S>) -> Result<Vec<u8>> {
    if !collector.is_described() {
        collector.describe().await;
    }
    let families = collector.collect().await;
    let mut body = Vec::new();
    TextEncoder::new().encode(&families, &mut body)?;
    Ok(body)
}

/// HTTP server exposing one metrics path.
pub struct MetricsServer {
    server: Arc<Server>,
    metrics_path: String,
}

impl MetricsServer {
    /// Binds the listening socket.
    ///
    /// # Errors
    /// Returns [`ExporterError::Http`] if the address cannot be bound.
    pub fn bind(addr: SocketAddr, metrics_path: impl Into<String>) -> Result<Self> {
        let server = Server::http(addr)
            .map_err(|e| ExporterError::http(format!("cannot listen on {addr}: {e}")))?;
        Ok(Self {
            server: Arc::new(server),
            metrics_path: metrics_path.into(),
        })
    }

    /// Address actually bound, useful when binding port 0.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serves requests until `shutdown` turns true or its sender is dropped.
    ///
    /// Must be called from within a multi-threaded runtime.
    ///
    /// # Errors
    /// Returns an error if the serving thread panicked.
    pub async fn serve<S>(
        self,
        collector: SharedCollector<S>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()>
    where
        S: SnapshotSource + 'static,
    {
        let server = Arc::clone(&self.server);
        let runtime = Handle::current();
        let worker = tokio::task::spawn_blocking(move || self.run(&collector, &runtime));

        while !*shutdown.borrow() {
            if shutdown.changed().await.is_err() {
                break;
            }
        }
        server.unblock();
        worker
            .await
            .map_err(|e| ExporterError::http(format!("server thread failed: {e}")))
    }

    fn run<S: SnapshotSource>(&self, collector: &SharedCollector<S>, runtime: &Handle) {
        tracing::info!(addr = ?self.local_addr(), path = %self.metrics_path, "serving metrics");
        for request in self.server.incoming_requests() {
            self.respond(request, collector, runtime);
        }
        tracing::info!("metrics server stopped");
    }

    fn respond<S: SnapshotSource>(&self, request: Request, collector: &SharedCollector<S>, runtime: &Handle) {
        let url = request.url().to_string();
        let path = url.split('?').next().unwrap_or_default();
        tracing::debug!(method = %request.method(), url = %url, "request");

        let result = if path == self.metrics_path {
            match runtime.block_on(async { scrape(&mut *collector.lock().await).await }) {
                Ok(body) => {
                    let mut response = Response::from_data(body);
                    if let Ok(header) = Header::from_bytes(
                        &b"Content-Type"[..],
                        TextEncoder::new().format_type().as_bytes(),
                    ) {
                        response.add_header(header);
                    }
                    request.respond(response)
                }
                Err(err) => {
                    tracing::error!(error = %err, "scrape failed");
                    request.respond(Response::from_string(err.to_string()).with_status_code(500))
                }
            }
        } else {
            request.respond(Response::from_string("Not Found").with_status_code(404))
        };

        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to send response");
        }
    }
}

impl std::fmt::Debug for MetricsServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsServer")
            .field("addr", &self.local_addr())
            .field("metrics_path", &self.metrics_path)
            .finish_non_exhaustive()
    }
}
