use actix_web::{HttpResponse, get, web};
use uuid::Uuid;
use vigil_service::database::models::Service;

use crate::error::{ApiError, success};
use crate::state::AppState;

/// Resolve a path id to a stored service; malformed ids are simply unknown
pub(super) async fn find_service(state: &AppState, raw_id: &str) -> Result<Service, ApiError> {
    let id = Uuid::parse_str(raw_id).map_err(|_| ApiError::service_not_found())?;
    state
        .store
        .get_service(id)
        .await
        .map_err(ApiError::internal("Failed to fetch service"))?
        .ok_or_else(ApiError::service_not_found)
}

#[get("/services")]
pub async fn list_services(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let services = state
        .store
        .list_services()
        .await
        .map_err(ApiError::internal("Failed to fetch services"))?;
    Ok(success(services))
}

#[get("/services/{id}")]
pub async fn get_service(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    Ok(success(find_service(&state, &id).await?))
}
