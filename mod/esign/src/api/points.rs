use std::collections::HashMap;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::routing::get;

use realdesk_core::ServiceError;

use crate::api::{AppState, user_id};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/points/balance", get(balance))
        .route("/points/history/{kind}", get(history))
}

/// GET /api/points/balance?userId
async fn balance(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let result = svc
        .points_balance(requester)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(result))
}

/// GET /api/points/history/{charge|usage}?userId
async fn history(
    State(svc): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let result = svc
        .points_history(requester, &kind)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(result))
}
