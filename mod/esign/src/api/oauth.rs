use std::collections::HashMap;

use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::routing::{get, post};

use realdesk_core::ServiceError;

use crate::api::{AppState, user_id};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ucansign/auth", get(start))
        .route("/ucansign/callback", get(callback))
        .route("/ucansign/disconnect", post(disconnect))
}

/// GET /api/ucansign/auth?userId — send the browser to the provider's
/// authorization page.
async fn start(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Redirect, ServiceError> {
    let requester = user_id(&query)?;
    let url = svc.authorize_url(requester).map_err(ServiceError::from)?;
    Ok(Redirect::temporary(&url))
}

/// GET /api/ucansign/callback?code&state — finish linking and bounce
/// back to the frontend.
async fn callback(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Redirect, ServiceError> {
    let code = query
        .get("code")
        .ok_or_else(|| ServiceError::Validation("code is required".into()))?;
    let state = query
        .get("state")
        .ok_or_else(|| ServiceError::Validation("state is required".into()))?;
    let target = svc
        .handle_callback(code, state)
        .await
        .map_err(ServiceError::from)?;
    Ok(Redirect::temporary(&target))
}

/// POST /api/ucansign/disconnect?userId — drop the stored tokens.
async fn disconnect(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    svc.disconnect(requester).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "success": true })))
}
