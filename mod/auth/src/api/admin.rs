use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};

use realdesk_core::ServiceError;
use realdesk_sql::Value;
use serde::Deserialize;

use crate::api::{AppState, requester_raw};
use crate::service::guard;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/stats", get(stats))
        .route("/admin/users/reset-password", post(reset_password))
}

/// GET /api/admin/stats — entity counts for the admin dashboard.
async fn stats(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let raw = requester_raw(&query, &headers)
        .ok_or_else(|| ServiceError::Unauthorized("requester identity is required".into()))?;
    let requester = svc.require_requester(Some(&raw)).map_err(ServiceError::from)?;
    if !guard::is_admin(&requester) {
        return Err(ServiceError::PermissionDenied("admin only".into()));
    }

    let users = svc.count_records("profiles", &[]).map_err(ServiceError::from)?;
    let pending = svc
        .count_records(
            "profiles",
            &[("status", Value::Text("pending_approval".to_string()))],
        )
        .map_err(ServiceError::from)?;
    let companies = svc
        .count_records("companies", &[])
        .map_err(ServiceError::from)?;

    Ok(Json(serde_json::json!({
        "users": users,
        "pendingUsers": pending,
        "companies": companies,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordRequest {
    target_user_id: String,
    new_password: String,
}

/// POST /api/admin/users/reset-password — admin sets a new password
/// for any account; all of its sessions are revoked.
async fn reset_password(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let raw = requester_raw(&query, &headers)
        .ok_or_else(|| ServiceError::Unauthorized("requester identity is required".into()))?;
    svc.reset_password(&raw, &req.target_user_id, &req.new_password)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "success": true })))
}
