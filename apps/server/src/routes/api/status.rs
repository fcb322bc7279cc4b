use actix_web::{HttpResponse, get, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use vigil_service::database::models::{Service, StatusCheck};
use vigil_service::monitoring::ServiceState;

use super::services::find_service;
use crate::error::{ApiError, success};
use crate::state::AppState;

/// A service together with its most recent check
#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub status: ServiceState,
    pub status_code: Option<u16>,
    pub response_time: Option<u64>,
    pub last_checked: Option<DateTime<Utc>>,
}

impl ServiceStatus {
    fn new(service: Service, latest: Option<StatusCheck>) -> Self {
        Self {
            status: ServiceState::from_latest(latest.as_ref()),
            status_code: latest.as_ref().and_then(|c| c.status_code),
            response_time: latest.as_ref().and_then(|c| c.response_time),
            last_checked: latest.map(|c| c.timestamp),
            id: service.id,
            name: service.name,
            url: service.url,
            description: service.description,
        }
    }
}

async fn status_of(state: &AppState, service: Service) -> Result<ServiceStatus, ApiError> {
    let latest = state
        .store
        .latest_check(service.id)
        .await
        .map_err(ApiError::internal("Failed to fetch service status"))?;
    Ok(ServiceStatus::new(service, latest))
}

#[get("/status")]
pub async fn current_status(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let services = state
        .store
        .list_services()
        .await
        .map_err(ApiError::internal("Failed to fetch current status"))?;

    let mut statuses = Vec::with_capacity(services.len());
    for service in services {
        statuses.push(status_of(&state, service).await?);
    }

    Ok(success(statuses))
}

#[get("/services/{id}/status")]
pub async fn service_status(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let service = find_service(&state, &id).await?;
    Ok(success(status_of(&state, service).await?))
}
