use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use realdesk_core::ServiceError;

use crate::api::AppState;

const SEARCH_LIMIT: usize = 10;

pub fn routes() -> Router<AppState> {
    Router::new().route("/companies/search", get(search))
}

/// GET /api/companies/search?query= — substring search over company
/// names for the signup autocomplete.
async fn search(
    State(svc): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let term = query.get("query").map(String::as_str).unwrap_or_default();
    let companies = svc
        .search_companies(term, SEARCH_LIMIT)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({ "companies": companies })))
}
