use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::executor::{CheckExecutor, CheckRun};
use crate::database::Store;
use crate::retention::{RetentionCleanup, RetentionPolicy, RetentionReport};

/// Scheduler settings, fixed for the lifetime of the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub interval: Duration,
    pub retention: RetentionPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30 * 60),
            retention: RetentionPolicy::default(),
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Services listed at the start of the tick
    pub services: usize,
    /// Checks persisted
    pub recorded: usize,
    /// Checks that could not be persisted
    pub failed: usize,
    pub retention: Option<RetentionReport>,
    /// Shutdown interrupted the tick; remaining services were skipped
    pub cancelled: bool,
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} services, {} checks recorded, {} not recorded",
            self.services, self.recorded, self.failed
        )?;
        if let Some(retention) = &self.retention {
            write!(
                f,
                ", retention removed {} checks and {} summaries",
                retention.checks_deleted, retention.summaries_deleted
            )?;
        }
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}

/// Monitoring scheduler - runs every service's check once per tick, one
/// service at a time, and sweeps old data during the midnight hour
pub struct MonitoringScheduler {
    store: Arc<dyn Store>,
    executor: CheckExecutor,
    cleanup: RetentionCleanup,
    config: SchedulerConfig,
    last_retention: Option<NaiveDate>,
}

impl MonitoringScheduler {
    pub fn new(config: SchedulerConfig, store: Arc<dyn Store>, executor: CheckExecutor) -> Self {
        let cleanup = RetentionCleanup::new(store.clone(), config.retention);
        Self { store, executor, cleanup, config, last_retention: None }
    }

    /// Tick until `cancel` fires. The first tick runs immediately; ticks
    /// never overlap, a tick that overruns the interval skips the missed ones.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval_secs = self.config.interval.as_secs(),
            retention_days = self.config.retention.retention_days,
            "Monitoring scheduler started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Monitoring scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let report = self.run_tick(&cancel).await;
                    info!("Monitoring cycle completed: {}", report);
                }
            }
        }
    }

    pub async fn run_tick(&mut self, cancel: &CancellationToken) -> TickReport {
        self.run_tick_at(Utc::now(), cancel).await
    }

    /// One tick as of `now`: check every service sequentially, then run the
    /// retention sweep if it is due
    pub async fn run_tick_at(&mut self, now: DateTime<Utc>, cancel: &CancellationToken) -> TickReport {
        let mut report = TickReport::default();

        let services = match self.store.list_services().await {
            Ok(services) => services,
            Err(e) => {
                error!("Failed to list services: {:#}", e);
                Vec::new()
            }
        };
        report.services = services.len();

        if services.is_empty() {
            debug!("No services found to monitor");
        }

        for service in &services {
            if cancel.is_cancelled() {
                warn!(service = %service.name, "Tick cancelled, skipping remaining services");
                report.cancelled = true;
                return report;
            }

            match self.executor.execute_check_until(service, cancel).await {
                CheckRun::Recorded(_) => report.recorded += 1,
                CheckRun::NotRecorded => report.failed += 1,
                CheckRun::Cancelled => {
                    warn!(service = %service.name, "Tick cancelled during check, skipping remaining services");
                    report.cancelled = true;
                    return report;
                }
            }
        }

        if RetentionPolicy::is_due(now, self.last_retention) {
            report.retention = self.run_retention(now).await;
        }

        report
    }

    /// Sweep expired data now, regardless of the hour
    pub async fn run_retention(&mut self, now: DateTime<Utc>) -> Option<RetentionReport> {
        match self.cleanup.run(now).await {
            Ok(retention) => {
                self.last_retention = Some(now.date_naive());
                Some(retention)
            }
            Err(e) => {
                error!("Retention cleanup failed: {:#}", e);
                None
            }
        }
    }
}
