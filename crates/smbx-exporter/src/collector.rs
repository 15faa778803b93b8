//! Prometheus collector adapter.
//!
//! Every `describe` and `collect` call asks its [`SnapshotSource`] for fresh
//! data, aggregates it and turns the samples into gauges. A failed fetch
//! costs one cycle: it is logged and the call yields nothing.

use std::collections::BTreeMap;
use std::sync::Arc;

use prometheus::core::{Collector as _, Desc, Describer as _};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, Opts};
use smbx_core::{MetricSample, StatusLogger, aggregate};

use crate::snapshot::SnapshotSource;

/// Default metric name prefix.
pub const DEFAULT_NAMESPACE: &str = "samba";

/// Name of the optional constant label carrying the host name.
pub const MACHINE_LABEL: &str = "machine";

/// Turns status snapshots into Prometheus gauges.
///
/// The descriptor registry only grows: once a name is described, its first
/// descriptor is kept for the lifetime of the collector. Calls take
/// `&mut self`, so callers sharing a collector must serialize them.
pub struct SambaCollector<S> {
    source: S,
    namespace: String,
    machine: Option<String>,
    descriptors: BTreeMap<String, Opts>,
    logger: Arc<dyn StatusLogger>,
}

impl<S: SnapshotSource> SambaCollector<S> {
    /// Creates a collector with an empty registry.
    #[must_use]
    pub fn new(source: S, namespace: impl Into<String>, logger: Arc<dyn StatusLogger>) -> Self {
        Self {
            source,
            namespace: namespace.into(),
            machine: None,
            descriptors: BTreeMap::new(),
            logger,
        }
    }

    /// Adds a constant `machine` label to every metric.
    #[must_use]
    pub fn with_machine_label(mut self, machine: impl Into<String>) -> Self {
        self.machine = Some(machine.into());
        self
    }

    /// Number of registered descriptors.
    #[must_use]
    pub fn descriptor_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns true once at least one descriptor is registered.
    #[must_use]
    pub fn is_described(&self) -> bool {
        !self.descriptors.is_empty()
    }

    /// Returns the registered names, in order.
    pub fn descriptor_names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    /// Fetches a snapshot and registers a descriptor per metric name.
    ///
    /// Returns the descriptors of the names seen in this cycle, or nothing
    /// if the snapshot could not be fetched.
    pub async fn describe(&mut self) -> Vec<Desc> {
        let Some(samples) = self.samples("describing metrics").await else {
            return Vec::new();
        };

        let mut descs = Vec::with_capacity(samples.len());
        for sample in samples {
            let opts = self
                .descriptors
                .entry(sample.name.clone())
                .or_insert_with(|| opts_for(&sample, &self.namespace, self.machine.as_deref()));
            match opts.describe() {
                Ok(desc) => descs.push(desc),
                Err(err) => {
                    self.logger
                        .error_with_addition(&err, &format!("while describing {}", sample.name));
                    self.descriptors.remove(&sample.name);
                }
            }
        }
        descs
    }

    /// Fetches a snapshot and emits one gauge per described metric.
    ///
    /// Names without a descriptor are logged and skipped. Nothing is
    /// emitted if the snapshot could not be fetched.
    pub async fn collect(&mut self) -> Vec<MetricFamily> {
        let Some(samples) = self.samples("collecting metrics").await else {
            return Vec::new();
        };

        let mut families = Vec::with_capacity(samples.len());
        for sample in samples {
            let Some(opts) = self.descriptors.get(&sample.name) else {
                self.logger
                    .error_message(&format!("No description found for {}", sample.name));
                continue;
            };
            match Gauge::with_opts(opts.clone()) {
                Ok(gauge) => {
                    gauge.set(sample.value);
                    families.extend(gauge.collect());
                }
                Err(err) => {
                    self.logger
                        .error_with_addition(&err, &format!("while collecting {}", sample.name));
                }
            }
        }
        families
    }

    async fn samples(&mut self, context: &str) -> Option<Vec<MetricSample>> {
        match self.source.fetch().await {
            Ok(snapshot) => Some(aggregate(&snapshot)),
            Err(err) => {
                self.logger
                    .error_with_addition(&err, &format!("while {context}"));
                None
            }
        }
    }
}

fn opts_for(sample: &MetricSample, namespace: &str, machine: Option<&str>) -> Opts {
    let opts = Opts::new(sample.name.clone(), sample.help.clone()).namespace(namespace);
    match machine {
        Some(machine) => opts.const_label(MACHINE_LABEL, machine),
        None => opts,
    }
}

impl<S> std::fmt::Debug for SambaCollector<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SambaCollector")
            .field("namespace", &self.namespace)
            .field("machine", &self.machine)
            .field("descriptors", &self.descriptors.len())
            .finish_non_exhaustive()
    }
}
