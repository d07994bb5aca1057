use crate::config::ScanConfig;
use crate::metrics::ScanMetrics;
use crate::scanner::Scanner;
use log::{error, info, warn};
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Scanning,
    Sleeping,
    Stopped,
}

/// Runs a scan immediately, then one per interval until shutdown. A failed
/// scan is retried after the shorter retry interval.
pub struct Scheduler {
    scanner: Scanner,
    interval: Duration,
    retry_interval: Duration,
    state: SchedulerState,
    metrics: ScanMetrics,
}

impl Scheduler {
    pub fn new(scanner: Scanner, scan: &ScanConfig, metrics: ScanMetrics) -> Self {
        Self {
            scanner,
            interval: scan.interval(),
            retry_interval: scan.retry_interval(),
            state: SchedulerState::Idle,
            metrics,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Runs one pass and returns how long to sleep before the next one.
    pub async fn run_once(&mut self) -> Duration {
        self.state = SchedulerState::Scanning;
        info!("Starting scan");
        match self.scanner.scan_once().await {
            Ok(report) => {
                info!(
                    "Scan complete: {} fetched from {} sources ({} failed), {} valid, {} unique, \
                     {} accepted, {} duplicates, {} sent, {} failed, {} deferred",
                    report.fetched,
                    report.sources,
                    report.failed_sources,
                    report.normalized,
                    report.unique,
                    report.accepted,
                    report.duplicates,
                    report.sent,
                    report.failed,
                    report.deferred
                );
                self.interval
            }
            Err(e) => {
                error!(
                    "Scan failed: {}. Retrying in {}s",
                    e,
                    self.retry_interval.as_secs()
                );
                self.metrics.failed_scans.inc();
                self.retry_interval
            }
        }
    }

    /// Loops until `true` is sent on `shutdown`. If the sender goes away
    /// without sending, scanning continues until the process is killed.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        let mut listening = true;
        while !*shutdown.borrow() {
            let pause = self.run_once().await;
            self.state = SchedulerState::Sleeping;

            let sleep = tokio::time::sleep(pause);
            tokio::pin!(sleep);
            loop {
                tokio::select! {
                    _ = &mut sleep => break,
                    changed = shutdown.changed(), if listening => {
                        if changed.is_err() {
                            warn!("Shutdown channel closed, stop signal no longer observed");
                            listening = false;
                        } else if *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
        }
        self.state = SchedulerState::Stopped;
        info!("Scheduler stopped");
    }
}
