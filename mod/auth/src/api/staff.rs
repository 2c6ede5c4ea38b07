use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};

use realdesk_core::ServiceError;

use crate::api::{AppState, requester_raw};
use crate::model::StaffActionRequest;

pub fn routes() -> Router<AppState> {
    Router::new().route("/company/staff", get(list_staff).put(staff_action))
}

/// GET /api/company/staff?companyName= — roster of a company, visible
/// to its members and to admins.
async fn list_staff(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = requester_raw(&query, &headers)
        .ok_or_else(|| ServiceError::Unauthorized("requester identity is required".into()))?;
    let company_name = query
        .get("companyName")
        .ok_or_else(|| ServiceError::Validation("companyName is required".into()))?;

    let company = svc
        .find_company_by_name(company_name)
        .map_err(ServiceError::from)?
        .ok_or_else(|| ServiceError::NotFound(format!("company '{}'", company_name)))?;

    let staff = svc
        .list_staff(&requester, &company.id)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "staff": staff })))
}

/// PUT /api/company/staff — approve/promote/demote a member.
async fn staff_action(
    State(svc): State<AppState>,
    Json(req): Json<StaffActionRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let updated = svc.staff_action(&req).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "user": updated })))
}
