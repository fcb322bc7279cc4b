use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use libsql::{Row, params};
use uuid::Uuid;

use super::models::{DailySummary, HealthStatus, NewService, NewStatusCheck, Service, StatusCheck};
use crate::pool::{LibsqlManager, LibsqlPool};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Service definitions
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    /// Get all registered services
    async fn list_services(&self) -> Result<Vec<Service>>;

    /// Get a service by id
    async fn get_service(&self, id: Uuid) -> Result<Option<Service>>;

    /// Register a new service
    async fn create_service(&self, service: &NewService) -> Result<Service>;

    /// Overwrite name, url and description. Returns false if no such service.
    async fn update_service(&self, service: &Service) -> Result<bool>;

    /// Delete a service together with its checks and summaries
    async fn delete_service(&self, id: Uuid) -> Result<bool>;
}

/// Append-only probe results
#[async_trait]
pub trait StatusCheckRepository: Send + Sync {
    /// Persist a probe result
    async fn create_status_check(&self, check: &NewStatusCheck) -> Result<StatusCheck>;

    /// Checks for a service with `from <= timestamp <= to`. Callers must not
    /// rely on the returned order.
    async fn query_checks(
        &self,
        service_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StatusCheck>>;

    /// Most recent check for a service
    async fn latest_check(&self, service_id: Uuid) -> Result<Option<StatusCheck>>;

    /// Delete every check with `timestamp < cutoff`, returning the count
    async fn delete_checks_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

/// Per-day aggregates
#[async_trait]
pub trait SummaryRepository: Send + Sync {
    async fn get_daily_summary(
        &self,
        service_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>>;

    /// Insert, or replace every field of the existing row for (service, date)
    async fn upsert_daily_summary(&self, summary: &DailySummary) -> Result<()>;

    /// Summaries with `from <= date <= to`, ascending by date
    async fn summaries_in_range(
        &self,
        service_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailySummary>>;

    /// Delete every summary with `date < cutoff`, returning the count
    async fn delete_summaries_older_than(&self, cutoff: NaiveDate) -> Result<u64>;
}

/// Everything the monitoring core and the API need from persistence
pub trait Store: ServiceRepository + StatusCheckRepository + SummaryRepository {}

impl<T> Store for T where T: ServiceRepository + StatusCheckRepository + SummaryRepository {}

/// LibSQL store implementation
pub struct LibsqlStore {
    pool: LibsqlPool,
}

impl LibsqlStore {
    pub fn new_from_pool(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    async fn get_conn(&self) -> Result<deadpool::managed::Object<LibsqlManager>> {
        self.pool.get().await.map_err(|e| anyhow!("Failed to get database connection: {}", e))
    }
}

fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| anyhow!("Invalid timestamp: {}", millis))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| anyhow!("Invalid date {}: {}", raw, e))
}

fn service_from_row(row: &Row) -> Result<Service> {
    let id: String = row.get(0)?;
    Ok(Service {
        id: Uuid::parse_str(&id)?,
        name: row.get(1)?,
        url: row.get(2)?,
        description: row.get(3)?,
        created_at: millis_to_datetime(row.get(4)?)?,
    })
}

fn check_from_row(row: &Row) -> Result<StatusCheck> {
    let service_id: String = row.get(1)?;
    Ok(StatusCheck {
        id: row.get(0)?,
        service_id: Uuid::parse_str(&service_id)?,
        timestamp: millis_to_datetime(row.get(2)?)?,
        status_code: row.get::<Option<i64>>(3)?.map(|v| v as u16),
        response_time: row.get::<Option<i64>>(4)?.map(|v| v as u64),
        is_operational: row.get::<i64>(5)? != 0,
        error: row.get(6)?,
    })
}

fn summary_from_row(row: &Row) -> Result<DailySummary> {
    let service_id: String = row.get(0)?;
    let date: String = row.get(1)?;
    let outage_periods: String = row.get(5)?;
    let status: String = row.get(7)?;

    Ok(DailySummary {
        service_id: Uuid::parse_str(&service_id)?,
        date: parse_date(&date)?,
        uptime_percentage: row.get(2)?,
        total_checks: row.get::<i64>(3)? as u32,
        failed_checks: row.get::<i64>(4)? as u32,
        outage_periods: serde_json::from_str(&outage_periods)?,
        avg_response_time: row.get::<i64>(6)? as u64,
        status: HealthStatus::parse(&status)
            .ok_or_else(|| anyhow!("Unknown summary status: {}", status))?,
    })
}

const SERVICE_COLUMNS: &str = "id, name, url, description, created_at";
const CHECK_COLUMNS: &str =
    "id, service_id, timestamp, status_code, response_time, is_operational, error";
const SUMMARY_COLUMNS: &str = "service_id, date, uptime_percentage, total_checks, failed_checks, outage_periods, avg_response_time, status";

#[async_trait]
impl ServiceRepository for LibsqlStore {
    async fn list_services(&self) -> Result<Vec<Service>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(&format!("SELECT {SERVICE_COLUMNS} FROM services ORDER BY created_at, name"), ())
            .await?;

        let mut services = Vec::new();
        while let Some(row) = rows.next().await? {
            services.push(service_from_row(&row)?);
        }

        Ok(services)
    }

    async fn get_service(&self, id: Uuid) -> Result<Option<Service>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                &format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?"),
                params![id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(service_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn create_service(&self, service: &NewService) -> Result<Service> {
        let conn = self.get_conn().await?;
        let created = Service {
            id: Uuid::new_v4(),
            name: service.name.clone(),
            url: service.url.clone(),
            description: service.description.clone(),
            created_at: Utc::now().trunc_subsecs(3),
        };

        conn.execute(
            "INSERT INTO services (id, name, url, description, created_at) VALUES (?, ?, ?, ?, ?)",
            params![
                created.id.to_string(),
                created.name.clone(),
                created.url.clone(),
                created.description.clone(),
                created.created_at.timestamp_millis()
            ],
        )
        .await?;

        Ok(created)
    }

    async fn update_service(&self, service: &Service) -> Result<bool> {
        let conn = self.get_conn().await?;
        let changed = conn
            .execute(
                "UPDATE services SET name = ?, url = ?, description = ? WHERE id = ?",
                params![
                    service.name.clone(),
                    service.url.clone(),
                    service.description.clone(),
                    service.id.to_string()
                ],
            )
            .await?;

        Ok(changed > 0)
    }

    async fn delete_service(&self, id: Uuid) -> Result<bool> {
        let conn = self.get_conn().await?;
        let id = id.to_string();

        conn.execute("DELETE FROM status_checks WHERE service_id = ?", params![id.clone()])
            .await?;
        conn.execute("DELETE FROM daily_summaries WHERE service_id = ?", params![id.clone()])
            .await?;
        let deleted = conn.execute("DELETE FROM services WHERE id = ?", params![id]).await?;

        Ok(deleted > 0)
    }
}

#[async_trait]
impl StatusCheckRepository for LibsqlStore {
    async fn create_status_check(&self, check: &NewStatusCheck) -> Result<StatusCheck> {
        let conn = self.get_conn().await?;

        conn.execute(
            "INSERT INTO status_checks (service_id, timestamp, status_code, response_time, is_operational, error) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                check.service_id.to_string(),
                check.timestamp.timestamp_millis(),
                check.status_code.map(|v| v as i64),
                check.response_time.map(|v| v as i64),
                if check.is_operational { 1 } else { 0 },
                check.error.clone()
            ],
        )
        .await?;

        Ok(check.clone().into_check(conn.last_insert_rowid()))
    }

    async fn query_checks(
        &self,
        service_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StatusCheck>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {CHECK_COLUMNS} FROM status_checks WHERE service_id = ? AND timestamp >= ? AND timestamp <= ?"
                ),
                params![service_id.to_string(), from.timestamp_millis(), to.timestamp_millis()],
            )
            .await?;

        let mut checks = Vec::new();
        while let Some(row) = rows.next().await? {
            checks.push(check_from_row(&row)?);
        }

        Ok(checks)
    }

    async fn latest_check(&self, service_id: Uuid) -> Result<Option<StatusCheck>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {CHECK_COLUMNS} FROM status_checks WHERE service_id = ? ORDER BY timestamp DESC, id DESC LIMIT 1"
                ),
                params![service_id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(check_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn delete_checks_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute(
                "DELETE FROM status_checks WHERE timestamp < ?",
                params![cutoff.timestamp_millis()],
            )
            .await?;

        Ok(deleted)
    }
}

#[async_trait]
impl SummaryRepository for LibsqlStore {
    async fn get_daily_summary(
        &self,
        service_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                &format!("SELECT {SUMMARY_COLUMNS} FROM daily_summaries WHERE service_id = ? AND date = ?"),
                params![service_id.to_string(), date.format(DATE_FORMAT).to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(summary_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn upsert_daily_summary(&self, summary: &DailySummary) -> Result<()> {
        let conn = self.get_conn().await?;
        let outage_periods = serde_json::to_string(&summary.outage_periods)?;

        conn.execute(
            "INSERT INTO daily_summaries (service_id, date, uptime_percentage, total_checks, failed_checks, outage_periods, avg_response_time, status, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(service_id, date) DO UPDATE SET
                uptime_percentage = excluded.uptime_percentage,
                total_checks = excluded.total_checks,
                failed_checks = excluded.failed_checks,
                outage_periods = excluded.outage_periods,
                avg_response_time = excluded.avg_response_time,
                status = excluded.status,
                updated_at = excluded.updated_at",
            params![
                summary.service_id.to_string(),
                summary.date.format(DATE_FORMAT).to_string(),
                summary.uptime_percentage,
                summary.total_checks as i64,
                summary.failed_checks as i64,
                outage_periods,
                summary.avg_response_time as i64,
                summary.status.as_str(),
                Utc::now().timestamp_millis()
            ],
        )
        .await?;

        Ok(())
    }

    async fn summaries_in_range(
        &self,
        service_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailySummary>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {SUMMARY_COLUMNS} FROM daily_summaries WHERE service_id = ? AND date >= ? AND date <= ? ORDER BY date ASC"
                ),
                params![
                    service_id.to_string(),
                    from.format(DATE_FORMAT).to_string(),
                    to.format(DATE_FORMAT).to_string()
                ],
            )
            .await?;

        let mut summaries = Vec::new();
        while let Some(row) = rows.next().await? {
            summaries.push(summary_from_row(&row)?);
        }

        Ok(summaries)
    }

    async fn delete_summaries_older_than(&self, cutoff: NaiveDate) -> Result<u64> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute(
                "DELETE FROM daily_summaries WHERE date < ?",
                params![cutoff.format(DATE_FORMAT).to_string()],
            )
            .await?;

        Ok(deleted)
    }
}
