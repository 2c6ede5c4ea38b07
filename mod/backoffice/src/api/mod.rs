mod briefing;
mod dashboard;
mod records;
mod system;

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;

use realdesk_core::ServiceError;

use crate::service::OfficeService;

/// Shared application state.
pub type AppState = Arc<OfficeService>;

/// Build the back-office API router. Routes are relative to `/api`.
pub fn build_router(svc: Arc<OfficeService>) -> Router {
    Router::new()
        .merge(records::routes())
        .merge(briefing::routes())
        .merge(system::routes())
        .merge(dashboard::routes())
        .with_state(svc)
}

/// The `userId` query parameter every authenticated back-office route
/// is keyed by.
pub(crate) fn user_id(query: &HashMap<String, String>) -> Result<&str, ServiceError> {
    query
        .get("userId")
        .map(String::as_str)
        .ok_or_else(|| ServiceError::Unauthorized("userId is required".into()))
}
