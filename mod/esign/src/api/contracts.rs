use std::collections::HashMap;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};

use realdesk_core::ServiceError;

use crate::api::{AppState, user_id};
use crate::model::{ActionRequest, CreateFromTemplateRequest, SyncRequest};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/contracts", get(list))
        .route("/contracts/sync", post(sync))
        .route("/contracts/actions", post(actions))
        .route("/contracts/create-from-template", post(create_from_template))
        .route("/contracts/download", get(download))
        .route("/contracts/templates", get(templates))
        .route("/contracts/{id}", get(detail))
}

/// GET /api/contracts?userId[&status] — provider list with local
/// overlays.
async fn list(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let contracts = svc
        .list_contracts(requester, query.get("status").map(String::as_str))
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "contracts": contracts })))
}

/// GET /api/contracts/{id}?userId — live document detail.
async fn detail(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let doc = svc
        .contract_detail(requester, &id)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(doc))
}

/// POST /api/contracts/sync?userId — on-demand completion workflow.
async fn sync(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    Json(req): Json<SyncRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let summary = svc
        .sync_contract(requester, &req)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "sync": summary })))
}

/// POST /api/contracts/actions?userId — forward a lifecycle action.
async fn actions(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let result = svc
        .dispatch_action(requester, &req)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "result": result })))
}

/// POST /api/contracts/create-from-template?userId
async fn create_from_template(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    Json(req): Json<CreateFromTemplateRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let created = svc
        .create_from_template(requester, &req)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(created))
}

/// GET /api/contracts/templates?userId — the provider's template list,
/// for picking a template id to create from.
async fn templates(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let templates = svc
        .list_templates(requester)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "templates": templates })))
}

/// GET /api/contracts/download?userId&contractId= — signed-file link.
async fn download(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let requester = user_id(&query)?;
    let contract_id = query
        .get("contractId")
        .ok_or_else(|| ServiceError::Validation("contractId is required".into()))?;
    let link = svc
        .download_link(requester, contract_id)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(link))
}
