use std::collections::HashMap;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::routing::get;

use realdesk_core::ServiceError;

use crate::api::{AppState, user_id};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/folders", get(list).post(create))
        .route("/folders/{id}/documents", get(documents))
}

/// GET /api/folders?userId
async fn list(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let folders = svc.list_folders(requester).await.map_err(ServiceError::from)?;
    Ok(Json(folders))
}

/// POST /api/folders?userId
async fn create(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let created = svc
        .create_folder(requester, &body)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(created))
}

/// GET /api/folders/{id}/documents?userId
async fn documents(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let docs = svc
        .folder_documents(requester, &id)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(docs))
}
