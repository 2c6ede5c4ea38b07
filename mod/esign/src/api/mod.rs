mod contracts;
mod embedding;
mod folders;
mod oauth;
mod points;

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;

use realdesk_core::ServiceError;

use crate::service::EsignService;

/// Shared application state.
pub type AppState = Arc<EsignService>;

/// Build the e-signature API router. Routes are relative to `/api`.
pub fn build_router(svc: Arc<EsignService>) -> Router {
    Router::new()
        .merge(contracts::routes())
        .merge(embedding::routes())
        .merge(oauth::routes())
        .merge(folders::routes())
        .merge(points::routes())
        .with_state(svc)
}

/// The `userId` query parameter carrying the requester identity.
pub(crate) fn user_id(query: &HashMap<String, String>) -> Result<&str, ServiceError> {
    query
        .get("userId")
        .map(String::as_str)
        .ok_or_else(|| ServiceError::Unauthorized("userId is required".into()))
}
