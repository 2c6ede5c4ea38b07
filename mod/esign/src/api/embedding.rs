use std::collections::HashMap;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::routing::post;

use realdesk_core::ServiceError;

use crate::api::{AppState, user_id};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/embedding/sign-creating", post(sign_creating))
        .route("/embedding/view/{documentId}", post(view))
        .route("/embedding/template-creating", post(template_creating))
        .route(
            "/embedding/template-modifying/{documentId}",
            post(template_modifying),
        )
}

/// POST /api/embedding/sign-creating?userId — iframe URL for drafting
/// and sending a new document.
async fn sign_creating(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let embed = svc
        .sign_embedding(requester, &body)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(embed))
}

/// POST /api/embedding/view/{documentId}?userId — read-only document view.
async fn view(
    State(svc): State<AppState>,
    Path(document_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let embed = svc
        .view_embedding(requester, &document_id, &body)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(embed))
}

/// POST /api/embedding/template-creating?userId — template editor for a
/// fresh template.
async fn template_creating(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let embed = svc
        .template_create_embedding(requester, &body)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(embed))
}

/// POST /api/embedding/template-modifying/{documentId}?userId — template
/// editor for an existing one.
async fn template_modifying(
    State(svc): State<AppState>,
    Path(document_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let embed = svc
        .template_modify_embedding(requester, &document_id, &body)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(embed))
}
