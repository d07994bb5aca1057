//! One pass of the alert pipeline:
//! fetch → normalize → aggregate → filter → recency check → format → dispatch.

use crate::api::{fetch_all, PairSource, Source};
use crate::config::Config;
use crate::error::Result;
use crate::metrics::ScanMetrics;
use crate::telegram::format::{format_alert, startup_notice};
use crate::telegram::Notifier;
use crate::utils::pacing::Pacer;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::sync::Arc;

pub mod aggregator;
pub mod dispatch;
pub mod filter;
pub mod normalizer;
pub mod recency;

pub use aggregator::aggregate;
pub use dispatch::AlertDispatcher;
pub use filter::{CandidateFilter, FilterRejection};
pub use normalizer::Normalizer;
pub use recency::RecencyGuard;

/// Counts from one scan pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub sources: usize,
    pub failed_sources: usize,
    pub fetched: usize,
    pub malformed: usize,
    pub normalized: usize,
    pub unique: usize,
    pub accepted: usize,
    pub duplicates: usize,
    pub format_failures: usize,
    pub sent: usize,
    pub failed: usize,
    /// Accepted but left for a later scan because the per-scan cap was hit.
    pub deferred: usize,
}

/// Everything a scan needs, built once at startup and reused every cycle.
/// The recency guard lives here and is only touched from the scanning task.
pub struct Scanner {
    sources: Vec<Source>,
    client: Arc<dyn PairSource>,
    pacer: Pacer,
    normalizer: Normalizer,
    filter: CandidateFilter,
    guard: RecencyGuard,
    dispatcher: AlertDispatcher,
    max_alerts_per_scan: usize,
    startup_notice: String,
    metrics: ScanMetrics,
}

impl Scanner {
    pub fn new(
        config: &Config,
        client: Arc<dyn PairSource>,
        notifier: Arc<dyn Notifier>,
        metrics: ScanMetrics,
    ) -> Self {
        Self {
            sources: config.sources.clone(),
            client,
            pacer: Pacer::new(config.pacing.request_delay()),
            normalizer: Normalizer::new(config.filter.max_age_seconds, config.scan.per_source_cap),
            filter: CandidateFilter::new(config.filter.clone()),
            guard: RecencyGuard::new(config.scan.duplicate_window()),
            dispatcher: AlertDispatcher::new(notifier, &config.pacing),
            max_alerts_per_scan: config.scan.max_alerts_per_scan,
            startup_notice: startup_notice(&config.filter, &config.scan),
            metrics,
        }
    }

    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dispatcher.set_dry_run(dry_run);
    }

    pub fn recency_guard(&self) -> &RecencyGuard {
        &self.guard
    }

    pub async fn announce_startup(&self) -> Result<()> {
        self.dispatcher.announce(&self.startup_notice).await
    }

    pub async fn scan_once(&mut self) -> Result<ScanReport> {
        self.scan_at(Utc::now()).await
    }

    /// Runs the pipeline with `now` as the reference instant for ages and the
    /// recency window. Only a lost channel aborts the pass early.
    pub async fn scan_at(&mut self, now: DateTime<Utc>) -> Result<ScanReport> {
        let mut report = ScanReport {
            sources: self.sources.len(),
            ..ScanReport::default()
        };

        let fetched = fetch_all(self.client.as_ref(), &self.sources, &mut self.pacer).await;
        let mut per_source = Vec::with_capacity(fetched.len());
        for source in fetched {
            if source.failed {
                report.failed_sources += 1;
                self.metrics.source_failures.inc();
            }
            report.fetched += source.records.len();
            report.malformed += source.malformed;

            let normalized = self.normalizer.normalize(source.records, now);
            report.malformed += normalized.rejected;
            report.normalized += normalized.candidates.len();
            per_source.push(normalized.candidates);
        }
        self.metrics.normalized.inc_by(report.normalized as u64);

        let candidates = aggregate(per_source);
        report.unique = candidates.len();
        self.guard.prune(now);

        for candidate in candidates {
            if let Err(reason) = self.filter.evaluate(&candidate, now) {
                debug!("{} ({}) rejected: {}", candidate.symbol, candidate.key, reason);
                continue;
            }
            report.accepted += 1;
            self.metrics.accepted.inc();

            if self.guard.is_recent(&candidate.key, now) {
                debug!("{} ({}) already alerted", candidate.symbol, candidate.key);
                report.duplicates += 1;
                self.metrics.duplicates.inc();
                continue;
            }

            if report.sent + report.failed >= self.max_alerts_per_scan {
                report.deferred += 1;
                continue;
            }

            let text = match format_alert(&candidate, now) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Skipping {} ({}): {}", candidate.symbol, candidate.key, e);
                    report.format_failures += 1;
                    continue;
                }
            };

            match self.dispatcher.dispatch(&text).await {
                Ok(()) => {
                    info!("Alert sent for {} ({})", candidate.symbol, candidate.key);
                    self.guard.record(&candidate.key, now);
                    report.sent += 1;
                    self.metrics.alerts_sent.inc();
                }
                Err(e) if e.aborts_cycle() => {
                    error!("Aborting scan, alert channel unavailable: {}", e);
                    self.metrics.dispatch_failures.inc();
                    return Err(e);
                }
                Err(e) => {
                    warn!("Alert for {} ({}) not delivered: {}", candidate.symbol, candidate.key, e);
                    report.failed += 1;
                    self.metrics.dispatch_failures.inc();
                }
            }
        }

        if report.deferred > 0 {
            info!(
                "Alert cap of {} reached, {} candidates deferred",
                self.max_alerts_per_scan, report.deferred
            );
        }
        self.metrics.scans.inc();
        Ok(report)
    }
}
