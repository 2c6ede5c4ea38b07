use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use realdesk_core::ServiceError;

use crate::api::{AppState, bearer_token};

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

/// GET /api/auth/me — normalized profile for the bearer of the token.
///
/// Non-active accounts get a dedicated 403 code so the frontend can
/// show the approval screen instead of a generic permission error.
async fn me(State(svc): State<AppState>, headers: HeaderMap) -> Result<Response, ServiceError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ServiceError::Unauthorized("missing bearer token".into()))?;

    let claims = svc.verify_token(token).map_err(ServiceError::from)?;
    let profile = svc.get_profile(&claims.sub).map_err(ServiceError::from)?;

    if profile.status != "active" {
        let body = serde_json::json!({
            "code": "ACCOUNT_INACTIVE",
            "message": "account is not active",
            "status": profile.status,
        });
        return Ok((StatusCode::FORBIDDEN, Json(body)).into_response());
    }

    let user = svc.normalized_user(&profile).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "user": user })).into_response())
}
