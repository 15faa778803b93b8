//! Request metrics following the RED method (Rate, Errors, Duration).
//!
//! Kept in memory and logged when the daemon stops; the daemon has no
//! scrape endpoint of its own.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Counters for handled requests.
///
/// Cloning shares the counters.
#[derive(Debug, Clone)]
pub struct RequestMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    requests_total: AtomicU64,
    errors_total: AtomicU64,

    // Durations in microseconds
    duration_sum_us: AtomicU64,
    duration_count: AtomicU64,
    duration_max_us: AtomicU64,

    start_time: Instant,
}

impl RequestMetrics {
    /// Creates zeroed metrics.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                requests_total: AtomicU64::new(0),
                errors_total: AtomicU64::new(0),
                duration_sum_us: AtomicU64::new(0),
                duration_count: AtomicU64::new(0),
                duration_max_us: AtomicU64::new(0),
                start_time: Instant::now(),
            }),
        }
    }

    /// Increments the request counter.
    pub fn record_request(&self) {
        self.inner.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns total requests handled.
    #[must_use]
    pub fn requests_total(&self) -> u64 {
        self.inner.requests_total.load(Ordering::Relaxed)
    }

    /// Increments the failed request counter.
    pub fn record_error(&self) {
        self.inner.errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns total failed requests.
    #[must_use]
    pub fn errors_total(&self) -> u64 {
        self.inner.errors_total.load(Ordering::Relaxed)
    }

    /// Returns failed requests divided by requests.
    #[must_use]
    pub fn error_rate(&self) -> f64 {
        let requests = self.requests_total();
        if requests > 0 {
            self.errors_total() as f64 / requests as f64
        } else {
            0.0
        }
    }

    /// Records how long one request took.
    pub fn record_duration(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.inner.duration_sum_us.fetch_add(us, Ordering::Relaxed);
        self.inner.duration_count.fetch_add(1, Ordering::Relaxed);
        self.inner.duration_max_us.fetch_max(us, Ordering::Relaxed);
    }

    /// Returns the mean request duration.
    #[must_use]
    pub fn duration_avg(&self) -> Duration {
        let count = self.inner.duration_count.load(Ordering::Relaxed);
        if count > 0 {
            let sum_us = self.inner.duration_sum_us.load(Ordering::Relaxed);
            Duration::from_micros(sum_us / count)
        } else {
            Duration::ZERO
        }
    }

    /// Returns the longest request duration.
    #[must_use]
    pub fn duration_max(&self) -> Duration {
        Duration::from_micros(self.inner.duration_max_us.load(Ordering::Relaxed))
    }

    /// Returns time since the metrics were created.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.inner.start_time.elapsed()
    }

    /// Captures the current values.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total(),
            errors_total: self.errors_total(),
            error_rate: self.error_rate(),
            duration_avg_us: self.duration_avg().as_micros() as u64,
            duration_max_us: self.duration_max().as_micros() as u64,
            uptime_secs: self.uptime().as_secs(),
        }
    }
}

impl Default for RequestMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`RequestMetrics`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total requests handled.
    pub requests_total: u64,
    /// Requests answered with a failure.
    pub errors_total: u64,
    /// Error rate (0.0 to 1.0).
    pub error_rate: f64,
    /// Mean duration in microseconds.
    pub duration_avg_us: u64,
    /// Longest duration in microseconds.
    pub duration_max_us: u64,
    /// Uptime in seconds.
    pub uptime_secs: u64,
}
