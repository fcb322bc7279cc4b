//! Retention of raw checks and daily summaries.
//!
//! Anything older than the configured window is deleted: status checks by
//! timestamp, summaries by date. Deletion is by threshold, so running the
//! sweep twice is harmless.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeDelta, Timelike, Utc};
use tracing::{debug, info};

use crate::database::Store;

/// How long monitoring data is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub retention_days: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self { retention_days: 45 }
    }
}

impl RetentionPolicy {
    pub fn new(retention_days: u32) -> Self {
        Self { retention_days }
    }

    /// Checks strictly before this instant are removed
    pub fn check_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - TimeDelta::days(i64::from(self.retention_days))
    }

    /// Summaries dated strictly before this day are removed
    pub fn summary_cutoff(&self, now: DateTime<Utc>) -> NaiveDate {
        self.check_cutoff(now).date_naive()
    }

    /// The sweep is due during hour 0 (UTC), at most once per date
    pub fn is_due(now: DateTime<Utc>, last_run: Option<NaiveDate>) -> bool {
        now.hour() == 0 && last_run != Some(now.date_naive())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionReport {
    pub checks_deleted: u64,
    pub summaries_deleted: u64,
}

/// Cleanup manager for expired monitoring data
pub struct RetentionCleanup {
    store: Arc<dyn Store>,
    policy: RetentionPolicy,
}

impl RetentionCleanup {
    pub fn new(store: Arc<dyn Store>, policy: RetentionPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Delete everything that fell out of the window as of `now`
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RetentionReport> {
        let check_cutoff = self.policy.check_cutoff(now);
        let summary_cutoff = self.policy.summary_cutoff(now);

        debug!(
            retention_days = self.policy.retention_days,
            %check_cutoff,
            %summary_cutoff,
            "Starting retention cleanup"
        );

        let checks_deleted = self.store.delete_checks_older_than(check_cutoff).await?;
        let summaries_deleted = self.store.delete_summaries_older_than(summary_cutoff).await?;

        info!(
            "Retention cleanup completed: {} status checks and {} daily summaries deleted",
            checks_deleted, summaries_deleted
        );

        Ok(RetentionReport { checks_deleted, summaries_deleted })
    }
}
