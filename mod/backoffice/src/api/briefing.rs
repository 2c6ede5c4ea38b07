use std::collections::HashMap;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use serde::Deserialize;

use realdesk_core::ServiceError;

use crate::api::{AppState, user_id};
use crate::model::CreateShareLink;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/briefing/create", post(create))
        .route("/briefing/list", get(list))
        .route("/briefing/update", put(update))
        .route("/briefing/expire", post(expire))
        .route("/briefing/{token}", get(fetch_public))
}

/// POST /api/briefing/create?userId — share a property.
async fn create(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    Json(req): Json<CreateShareLink>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let link = svc
        .create_share_link(requester, &req)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "link": link })))
}

/// GET /api/briefing/list?userId — the requester's links.
async fn list(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let links = svc.list_share_links(requester).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "links": links })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkMutation {
    link_id: String,
    #[serde(default)]
    options: Option<serde_json::Value>,
}

/// PUT /api/briefing/update?userId — patch display options.
async fn update(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    Json(req): Json<LinkMutation>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let patch = req.options.unwrap_or_else(|| serde_json::json!({}));
    let link = svc
        .update_share_link(requester, &req.link_id, &patch)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "link": link })))
}

/// POST /api/briefing/expire?userId — kill a link immediately.
async fn expire(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    Json(req): Json<LinkMutation>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let link = svc
        .expire_share_link(requester, &req.link_id)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "link": link })))
}

/// GET /api/briefing/{token} — the public, unauthenticated view.
async fn fetch_public(
    State(svc): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let view = svc.fetch_share_link(&token).map_err(ServiceError::from)?;
    Ok(Json(view))
}
