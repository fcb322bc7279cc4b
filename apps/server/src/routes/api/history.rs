use actix_web::{HttpResponse, get, web};
use chrono::{NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use vigil_service::aggregation::total_outage_duration;
use vigil_service::database::models::{DailySummary, Service};

use super::services::find_service;
use crate::error::{ApiError, success};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    days: Option<String>,
}

impl HistoryQuery {
    /// Positive whole number of days, otherwise the configured default
    fn days(&self, default: u32) -> u32 {
        self.days
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|days| *days > 0)
            .unwrap_or(default)
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryDay {
    #[serde(flatten)]
    pub summary: DailySummary,
    pub outage_seconds: i64,
}

impl From<DailySummary> for HistoryDay {
    fn from(summary: DailySummary) -> Self {
        let outage_seconds = total_outage_duration(&summary.outage_periods).num_seconds();
        Self { summary, outage_seconds }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceHistory {
    #[serde(flatten)]
    pub service: Service,
    pub history: Vec<HistoryDay>,
}

fn date_range(days: u32) -> (NaiveDate, NaiveDate) {
    let today = Utc::now().date_naive();
    (today - TimeDelta::days(i64::from(days)), today)
}

async fn history_of(
    state: &AppState,
    service: Service,
    (from, to): (NaiveDate, NaiveDate),
    message: &'static str,
) -> Result<ServiceHistory, ApiError> {
    let history = state
        .store
        .summaries_in_range(service.id, from, to)
        .await
        .map_err(ApiError::internal(message))?
        .into_iter()
        .map(HistoryDay::from)
        .collect();
    Ok(ServiceHistory { service, history })
}

#[get("/history")]
pub async fn status_history(
    state: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, ApiError> {
    const MESSAGE: &str = "Failed to fetch status history";

    let range = date_range(query.days(state.history_days));
    let services = state.store.list_services().await.map_err(ApiError::internal(MESSAGE))?;

    let mut histories = Vec::with_capacity(services.len());
    for service in services {
        histories.push(history_of(&state, service, range, MESSAGE).await?);
    }

    Ok(success(histories))
}

#[get("/services/{id}/history")]
pub async fn service_history(
    state: web::Data<AppState>,
    id: web::Path<String>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, ApiError> {
    let service = find_service(&state, &id).await?;
    let range = date_range(query.days(state.history_days));
    Ok(success(history_of(&state, service, range, "Failed to fetch service history").await?))
}
