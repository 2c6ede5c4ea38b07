//! Route registration — collects all module routes + system endpoints.

use axum::Router;
use axum::response::IntoResponse;
use axum::routing::get;
use tracing::info;

/// Build the complete router with all routes.
///
/// The public surface is flat: every module mounts directly under `/api`
/// (`/api/login`, `/api/contracts`, `/api/properties`, ...). Module
/// routers already carry their own state.
pub fn build_router(module_routes: Vec<(&str, Router)>) -> Router {
    let mut api = Router::new();
    for (name, router) in module_routes {
        info!("Mounting {} routes under /api", name);
        api = api.merge(router);
    }

    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .nest("/api", api)
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "realdeskd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
