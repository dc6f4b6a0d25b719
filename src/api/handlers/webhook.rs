//! Global webhook ingest: `POST /api/webhook?source=<tag>`.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{WebhookAccepted, WebhookParams};
use crate::app_state::AppState;
use crate::domain::RelayEvent;
use crate::error::{GatewayError, WebhookErrorResponse};

/// `POST /api/webhook` — Relay an external notification to every monitor.
///
/// # Errors
///
/// Returns [`GatewayError::MissingWebhookSource`] when `source` is absent or
/// empty (a repeated `source` uses its first non-empty value), and [`GatewayError::InvalidRequest`] when the body is not JSON.
#[utoipa::path(
    post,
    path = "/api/webhook",
    tag = "Monitor",
    summary = "Ingest a webhook",
    description = "Wraps an arbitrary JSON payload in a `webhook_event` tagged with `source` and broadcasts it to every monitor stream.",
    params(WebhookParams),
    request_body(content = serde_json::Value, description = "Arbitrary JSON payload"),
    responses(
        (status = 200, description = "Event broadcast", body = WebhookAccepted),
        (status = 400, description = "Missing `source` parameter", body = WebhookErrorResponse),
    )
)]
pub async fn receive_webhook(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<impl IntoResponse, GatewayError> {
    let Some(source) = WebhookParams::from_pairs(pairs).source else {
        tracing::warn!("webhook rejected: missing source");
        return Err(GatewayError::MissingWebhookSource);
    };

    let payload = parse_payload(&body).map_err(|err| {
        GatewayError::InvalidRequest(format!("El cuerpo del webhook no es JSON válido: {err}"))
    })?;

    let delivered = state
        .event_bus
        .broadcast_all(&RelayEvent::webhook(source.as_str(), payload));
    tracing::info!(%source, delivered, "webhook broadcast");

    Ok(Json(WebhookAccepted::broadcasted()))
}

/// Parses a webhook body; an empty body is treated as `{}`.
pub(crate) fn parse_payload(body: &[u8]) -> Result<serde_json::Value, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    serde_json::from_slice(body)
}

/// Webhook routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/webhook", post(receive_webhook))
}
