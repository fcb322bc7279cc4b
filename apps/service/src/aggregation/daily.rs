use std::sync::Arc;

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::outage::{extract_outages, uptime_percentage};
use crate::database::Store;
use crate::database::models::{DailySummary, HealthStatus, StatusCheck};

/// Inclusive UTC bounds of `date`: 00:00:00.000 through 23:59:59.999
pub fn day_bounds(date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let end_time = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
        .ok_or_else(|| anyhow!("Invalid end-of-day time"))?;

    Ok((date.and_time(NaiveTime::MIN).and_utc(), date.and_time(end_time).and_utc()))
}

/// Compute the full summary of one day from its checks, in any order.
///
/// Pure and deterministic: the same set of checks always yields an identical
/// summary.
pub fn calculate_daily_summary(
    service_id: Uuid,
    date: NaiveDate,
    checks: &[StatusCheck],
) -> DailySummary {
    if checks.is_empty() {
        return DailySummary {
            service_id,
            date,
            uptime_percentage: 0.0,
            total_checks: 0,
            failed_checks: 0,
            outage_periods: Vec::new(),
            avg_response_time: 0,
            status: HealthStatus::Red,
        };
    }

    let mut sorted = checks.to_vec();
    sorted.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));

    let total_checks = sorted.len() as u32;
    let failed_checks = sorted.iter().filter(|c| !c.is_operational).count() as u32;

    let response_times: Vec<u64> = sorted
        .iter()
        .filter(|c| c.is_operational)
        .filter_map(|c| c.response_time)
        .collect();
    let avg_response_time = if response_times.is_empty() {
        0
    } else {
        (response_times.iter().sum::<u64>() as f64 / response_times.len() as f64).round() as u64
    };

    let status = if failed_checks == 0 {
        HealthStatus::Green
    } else if failed_checks == total_checks {
        HealthStatus::Red
    } else {
        HealthStatus::Yellow
    };

    DailySummary {
        service_id,
        date,
        uptime_percentage: uptime_percentage(total_checks, failed_checks),
        total_checks,
        failed_checks,
        outage_periods: extract_outages(&sorted),
        avg_response_time,
        status,
    }
}

/// Recomputes and stores the summary of the current UTC day
pub struct DailyAggregator {
    store: Arc<dyn Store>,
}

impl DailyAggregator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Rebuild the summary for the day containing `now` (not the day of the
    /// triggering check) and upsert it. Nothing is written when the day has
    /// no checks.
    pub async fn update(&self, service_id: Uuid, now: DateTime<Utc>) -> Result<Option<DailySummary>> {
        let today = now.date_naive();
        let (start, end) = day_bounds(today)?;

        let checks = self.store.query_checks(service_id, start, end).await?;
        if checks.is_empty() {
            debug!("No checks found for service {} on {}", service_id, today);
            return Ok(None);
        }

        let summary = calculate_daily_summary(service_id, today, &checks);
        let existed = self.store.get_daily_summary(service_id, today).await?.is_some();
        self.store.upsert_daily_summary(&summary).await?;

        info!(
            service_id = %service_id,
            date = %today,
            uptime = summary.uptime_percentage,
            status = %summary.status,
            "{} daily summary",
            if existed { "Updated" } else { "Created" }
        );

        Ok(Some(summary))
    }
}
