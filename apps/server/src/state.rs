use std::sync::Arc;

use vigil_service::database::Store;

/// Shared by every handler through `web::Data`
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// History window used when a request does not ask for one
    pub history_days: u32,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, history_days: u32) -> Self {
        Self { store, history_days }
    }
}
