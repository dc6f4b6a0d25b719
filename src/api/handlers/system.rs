//! System endpoints: root index, health check, OpenAPI document.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use utoipa::OpenApi;

use crate::api::docs::ApiDoc;
use crate::api::dto::{HealthResponse, IndexResponse};
use crate::app_state::AppState;

/// `GET /` — Service banner and tool catalog.
#[utoipa::path(
    get,
    path = "/",
    tag = "System",
    summary = "Service index",
    description = "Reports that the gateway is online and where each tool is documented.",
    responses(
        (status = 200, description = "Gateway is online", body = IndexResponse),
    )
)]
pub async fn index_handler() -> impl IntoResponse {
    let available_tools = BTreeMap::from([
        ("search", "/api/openapi.json#/paths/~1api~1search~1web-search"),
        ("monitor", "/api/openapi.json#/paths/~1api~1events"),
        ("evolution", "/api/openapi.json#/paths/~1api~1evolution~1webhook"),
    ]);
    Json(IndexResponse {
        status: "online",
        message: "El servidor de herramientas está funcionando.",
        available_tools,
    })
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health, version, current timestamp and the number of open event streams.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            monitor_subscribers: state.event_bus.monitor_count(),
            instance_listeners: state.event_bus.instance_keys(),
        }),
    )
}

/// `GET /api/openapi.json` — OpenAPI document for every route.
pub async fn openapi_handler() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/openapi.json", get(openapi_handler))
}
