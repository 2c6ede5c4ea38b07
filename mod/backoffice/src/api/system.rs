use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::get;

use realdesk_core::ServiceError;

use crate::api::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/system/settings", get(read).post(write))
}

/// GET /api/system/settings — announcement and feature flags.
async fn read(State(svc): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "settings": svc.settings() }))
}

/// POST /api/system/settings — merge-patch and persist.
async fn write(
    State(svc): State<AppState>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let settings = svc.update_settings(&patch).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "settings": settings })))
}
