use std::collections::HashMap;

use axum::Router;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::Json;

use realdesk_core::ServiceError;

use crate::api::{AppState, user_id};
use crate::model::EntityKind;

pub fn routes() -> Router<AppState> {
    let mut router = Router::new();
    for (path, kind) in [
        ("/properties", EntityKind::Property),
        ("/customers", EntityKind::Customer),
        ("/schedules", EntityKind::Schedule),
        ("/business-cards", EntityKind::BusinessCard),
        ("/notices", EntityKind::Notice),
        ("/templates", EntityKind::Template),
    ] {
        router = router.route(
            path,
            get(move |state, query| list_or_get(state, query, kind))
                .post(move |state, query, body| create(state, query, body, kind))
                .put(move |state, query, body| update(state, query, body, kind))
                .delete(move |state, query| delete(state, query, kind)),
        );
    }
    router
}

/// GET /api/{entities}?userId[&id][&status] — list, or a single record
/// when `id` is given.
async fn list_or_get(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    kind: EntityKind,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;

    if let Some(id) = query.get("id") {
        let record = svc
            .get_entity(requester, kind, id)
            .map_err(ServiceError::from)?;
        return Ok(Json(serde_json::json!({ "item": record })));
    }

    let items = svc
        .list_entities(requester, kind, query.get("status").map(String::as_str))
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "items": items })))
}

/// POST /api/{entities}?userId — create from the request document.
async fn create(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<serde_json::Value>,
    kind: EntityKind,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let record = svc
        .create_entity(requester, kind, body)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "item": record })))
}

/// PUT /api/{entities}?userId&id — merge-patch update.
async fn update(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<serde_json::Value>,
    kind: EntityKind,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let id = query
        .get("id")
        .ok_or_else(|| ServiceError::Validation("id is required".into()))?;
    let record = svc
        .update_entity(requester, kind, id, &body)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "item": record })))
}

/// DELETE /api/{entities}?userId&id
async fn delete(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    kind: EntityKind,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let id = query
        .get("id")
        .ok_or_else(|| ServiceError::Validation("id is required".into()))?;
    svc.delete_entity(requester, kind, id)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "success": true })))
}
