use std::sync::Arc;

use actix_web::web;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use uuid::Uuid;
use vigil_service::database::models::{
    DailySummary, HealthStatus, NewService, NewStatusCheck, OutagePeriod, Service, StatusCheck,
};
use vigil_service::database::{
    MemoryStore, ServiceRepository, StatusCheckRepository, Store, SummaryRepository,
};

use crate::state::AppState;

pub const HISTORY_DAYS: u32 = 45;

pub struct Seed {
    /// Latest check answered 200
    pub up: Service,
    /// Latest check failed to connect
    pub down: Service,
    /// Never checked
    pub fresh: Service,
}

pub fn summary(service_id: Uuid, date: NaiveDate, outages: Vec<OutagePeriod>) -> DailySummary {
    let failed = outages.len() as u32;
    DailySummary {
        service_id,
        date,
        uptime_percentage: if failed == 0 { 100.0 } else { 50.0 },
        total_checks: 2,
        failed_checks: failed,
        outage_periods: outages,
        avg_response_time: 150,
        status: if failed == 0 { HealthStatus::Green } else { HealthStatus::Yellow },
    }
}

fn check(service_id: Uuid, timestamp: DateTime<Utc>, status_code: Option<u16>) -> NewStatusCheck {
    NewStatusCheck {
        service_id,
        timestamp,
        status_code,
        response_time: Some(150),
        is_operational: status_code.is_some_and(|c| (200..400).contains(&c)),
        error: status_code.is_none().then(|| "connection refused".to_string()),
    }
}

/// Three services, a few checks and summaries spread over and beyond the
/// default history window
pub async fn seed(store: &MemoryStore) -> Seed {
    let now = Utc::now();
    let today = now.date_naive();

    let up = store.create_service(&NewService::new("API", "https://api.example.com/health")).await.unwrap();
    let down = store
        .create_service(&NewService::new("Web", "https://www.example.com").with_description("Marketing site"))
        .await
        .unwrap();
    let fresh = store.create_service(&NewService::new("Docs", "https://docs.example.com")).await.unwrap();

    store.create_status_check(&check(up.id, now - TimeDelta::minutes(60), None)).await.unwrap();
    store.create_status_check(&check(up.id, now - TimeDelta::minutes(30), Some(200))).await.unwrap();
    store.create_status_check(&check(down.id, now - TimeDelta::minutes(30), None)).await.unwrap();

    let outage = OutagePeriod {
        start: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        end: NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
    };
    for days_ago in [0, 3, 60] {
        let outages = if days_ago == 3 { vec![outage] } else { Vec::new() };
        store
            .upsert_daily_summary(&summary(up.id, today - TimeDelta::days(days_ago), outages))
            .await
            .unwrap();
    }
    store.upsert_daily_summary(&summary(down.id, today, vec![outage])).await.unwrap();

    Seed { up, down, fresh }
}

pub fn state_with(store: Arc<dyn Store>) -> web::Data<AppState> {
    web::Data::new(AppState::new(store, HISTORY_DAYS))
}

pub async fn seeded_state() -> (web::Data<AppState>, Seed) {
    let store = Arc::new(MemoryStore::new());
    let seed = seed(&store).await;
    (state_with(store), seed)
}

pub fn broken_state() -> web::Data<AppState> {
    state_with(Arc::new(BrokenStore))
}

/// Build the test service for the full route table over `state`
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new().app_data($state).configure(crate::routes::routes),
        )
        .await
    };
}
pub(crate) use init_app;

/// Every store call fails
pub struct BrokenStore;

fn unavailable<T>() -> Result<T> {
    Err(anyhow!("database is unavailable"))
}

#[async_trait]
impl ServiceRepository for BrokenStore {
    async fn list_services(&self) -> Result<Vec<Service>> {
        unavailable()
    }

    async fn get_service(&self, _id: Uuid) -> Result<Option<Service>> {
        unavailable()
    }

    async fn create_service(&self, _service: &NewService) -> Result<Service> {
        unavailable()
    }

    async fn update_service(&self, _service: &Service) -> Result<bool> {
        unavailable()
    }

    async fn delete_service(&self, _id: Uuid) -> Result<bool> {
        unavailable()
    }
}

#[async_trait]
impl StatusCheckRepository for BrokenStore {
    async fn create_status_check(&self, _check: &NewStatusCheck) -> Result<StatusCheck> {
        unavailable()
    }

    async fn query_checks(
        &self,
        _service_id: Uuid,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> Result<Vec<StatusCheck>> {
        unavailable()
    }

    async fn latest_check(&self, _service_id: Uuid) -> Result<Option<StatusCheck>> {
        unavailable()
    }

    async fn delete_checks_older_than(&self, _cutoff: DateTime<Utc>) -> Result<u64> {
        unavailable()
    }
}

#[async_trait]
impl SummaryRepository for BrokenStore {
    async fn get_daily_summary(&self, _service_id: Uuid, _date: NaiveDate) -> Result<Option<DailySummary>> {
        unavailable()
    }

    async fn upsert_daily_summary(&self, _summary: &DailySummary) -> Result<()> {
        unavailable()
    }

    async fn summaries_in_range(
        &self,
        _service_id: Uuid,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Vec<DailySummary>> {
        unavailable()
    }

    async fn delete_summaries_older_than(&self, _cutoff: NaiveDate) -> Result<u64> {
        unavailable()
    }
}
