use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use realdesk_core::ServiceError;

use crate::api::AppState;
use crate::model::LoginRequest;

pub fn routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// POST /api/login — legacy id (or email) + password → token pair and
/// normalized user.
async fn login(
    State(svc): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let (tokens, user) = svc.login(&req).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({
        "tokens": tokens,
        "user": user,
    })))
}
