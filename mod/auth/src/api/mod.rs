mod admin;
mod companies;
mod login;
mod me;
mod signup;
mod staff;

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::http::HeaderMap;

use crate::service::AuthService;

/// Shared application state.
pub type AppState = Arc<AuthService>;

/// Build the auth API router. Routes are relative to `/api`.
pub fn build_router(svc: Arc<AuthService>) -> Router {
    Router::new()
        .merge(login::routes())
        .merge(signup::routes())
        .merge(me::routes())
        .merge(staff::routes())
        .merge(companies::routes())
        .merge(admin::routes())
        .with_state(svc)
}

/// Pull the raw requester identifier off a request.
///
/// Legacy clients send it as a `requesterId` or `userId` query
/// parameter; newer ones use the `x-user-id` header. Query wins.
pub fn requester_raw(query: &HashMap<String, String>, headers: &HeaderMap) -> Option<String> {
    query
        .get("requesterId")
        .or_else(|| query.get("userId"))
        .cloned()
        .or_else(|| {
            headers
                .get("x-user-id")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        })
}

/// Extract the Bearer token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
