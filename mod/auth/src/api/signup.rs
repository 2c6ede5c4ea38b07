use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use realdesk_core::ServiceError;

use crate::api::AppState;
use crate::model::SignupRequest;

pub fn routes() -> Router<AppState> {
    Router::new().route("/signup", post(signup))
}

/// POST /api/signup — register an account, creating or joining a
/// company by name.
async fn signup(
    State(svc): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let user = svc.signup(&req).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "user": user })))
}
