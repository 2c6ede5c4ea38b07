use std::collections::HashMap;

use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::routing::get;

use realdesk_core::ServiceError;

use crate::api::{AppState, user_id};

pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

/// GET /api/dashboard?userId — landing-page counters.
async fn dashboard(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let counts = svc.dashboard(requester).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "counts": counts })))
}
