//! Read-only views over the monitoring data.

mod history;
mod services;
mod status;

macros_utils::routes! {
    route services::list_services,
    route services::get_service,
    route status::current_status,
    route status::service_status,
    route history::status_history,
    route history::service_history,
}
