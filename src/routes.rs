// src/routes.rs

use axum::{
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{config::AppState, docs::ApiDoc, handlers};

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/api/service-accounts",
            post(handlers::service_accounts::provision_service_account),
        )
        .route("/api/scaling", post(handlers::scaling::run_scaling))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(app_state)
}
