//! Evolution (WhatsApp session) real-time relay.
//!
//! The Evolution API posts instance notifications to
//! `POST /api/evolution/webhook`; each payload is forwarded verbatim to the
//! status stream opened for the instance named in its `instance` field.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};

use super::webhook::parse_payload;
use crate::api::dto::EVOLUTION_WEBHOOK_ACK;
use crate::app_state::AppState;
use crate::sse::handler::instance_status_stream;

/// `POST /api/evolution/webhook` — Relay a notification to its instance's
/// listener.
///
/// Always answers `200 Webhook received`, whether or not a listener exists,
/// so the sender never retries because of a missing listener.
#[utoipa::path(
    post,
    path = "/api/evolution/webhook",
    tag = "Evolution",
    summary = "Ingest an Evolution API webhook",
    description = "Forwards the payload, unmodified, to the status stream of the instance named in its `instance` field. Dropped when nobody listens.",
    request_body(content = serde_json::Value, description = "Evolution API webhook payload"),
    responses(
        (status = 200, description = "Webhook received", content_type = "text/plain", body = String),
    )
)]
pub async fn receive_instance_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> impl IntoResponse {
    match parse_payload(&body) {
        Ok(payload) => relay(&state, &payload),
        Err(err) => tracing::warn!(error = %err, "evolution webhook body is not JSON; dropped"),
    }
    (StatusCode::OK, EVOLUTION_WEBHOOK_ACK)
}

fn relay(state: &AppState, payload: &serde_json::Value) {
    let Some(instance) = payload.get("instance").and_then(serde_json::Value::as_str) else {
        tracing::info!("evolution webhook without instance; dropped");
        return;
    };
    tracing::debug!(%instance, %payload, "evolution webhook received");

    if state.event_bus.broadcast_to(instance, payload) {
        tracing::info!(%instance, "evolution webhook relayed");
    } else {
        tracing::info!(%instance, "no listener for instance; event dropped");
    }
}

/// Evolution routes, mounted under `/api/evolution`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/instances/{instance_name}/status-stream",
            get(instance_status_stream),
        )
        .route("/webhook", post(receive_instance_webhook))
}
