use crate::error::Result;
use prometheus::{IntCounter, Registry};

/// Counters for the scan pipeline, registered once at startup.
#[derive(Clone)]
pub struct ScanMetrics {
    pub scans: IntCounter,
    pub failed_scans: IntCounter,
    pub source_failures: IntCounter,
    pub normalized: IntCounter,
    pub accepted: IntCounter,
    pub duplicates: IntCounter,
    pub alerts_sent: IntCounter,
    pub dispatch_failures: IntCounter,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub scans: u64,
    pub failed_scans: u64,
    pub source_failures: u64,
    pub normalized: u64,
    pub accepted: u64,
    pub duplicates: u64,
    pub alerts_sent: u64,
    pub dispatch_failures: u64,
}

impl ScanMetrics {
    pub fn new(registry: &Registry) -> Result<Self> {
        let metrics = Self {
            scans: IntCounter::new("dex_scans_total", "Completed scan passes")?,
            failed_scans: IntCounter::new("dex_failed_scans_total", "Scan passes aborted by an error")?,
            source_failures: IntCounter::new("dex_source_failures_total", "Source requests that failed")?,
            normalized: IntCounter::new("dex_candidates_normalized_total", "Records that passed validation")?,
            accepted: IntCounter::new("dex_candidates_accepted_total", "Candidates that passed the filter")?,
            duplicates: IntCounter::new("dex_duplicates_total", "Candidates skipped as recently alerted")?,
            alerts_sent: IntCounter::new("dex_alerts_sent_total", "Alerts delivered")?,
            dispatch_failures: IntCounter::new("dex_dispatch_failures_total", "Alerts that failed to send")?,
        };

        registry.register(Box::new(metrics.scans.clone()))?;
        registry.register(Box::new(metrics.failed_scans.clone()))?;
        registry.register(Box::new(metrics.source_failures.clone()))?;
        registry.register(Box::new(metrics.normalized.clone()))?;
        registry.register(Box::new(metrics.accepted.clone()))?;
        registry.register(Box::new(metrics.duplicates.clone()))?;
        registry.register(Box::new(metrics.alerts_sent.clone()))?;
        registry.register(Box::new(metrics.dispatch_failures.clone()))?;

        Ok(metrics)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            scans: self.scans.get(),
            failed_scans: self.failed_scans.get(),
            source_failures: self.source_failures.get(),
            normalized: self.normalized.get(),
            accepted: self.accepted.get(),
            duplicates: self.duplicates.get(),
            alerts_sent: self.alerts_sent.get(),
            dispatch_failures: self.dispatch_failures.get(),
        }
    }
}
