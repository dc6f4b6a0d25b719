//! Axum handlers for the subscription endpoints.

use axum::extract::{Path, State};
use axum::response::IntoResponse;

use super::stream::sse_response;
use crate::app_state::AppState;
use crate::domain::{InstanceAck, RelayEvent, SubscriberKey};

/// `GET /api/events` — Subscribe to the global monitor stream.
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "Monitor",
    summary = "Global monitor stream",
    description = "Opens a Server-Sent Events stream carrying every request, response and webhook event handled by the gateway. The first frame is `{\"type\":\"connection\",\"status\":\"established\"}`.",
    responses(
        (status = 200, description = "Event stream opened", content_type = "text/event-stream", body = String),
    )
)]
pub async fn monitor_stream(State(state): State<AppState>) -> impl IntoResponse {
    let subscription = state
        .event_bus
        .subscribe(SubscriberKey::Global, &RelayEvent::connection_established());
    tracing::info!(subscriber = %subscription.id(), "monitor client connected");
    sse_response(subscription, state.sse_keep_alive)
}

/// `GET /api/evolution/instances/{instanceName}/status-stream` — Listen to
/// webhook events for one instance.
#[utoipa::path(
    get,
    path = "/api/evolution/instances/{instanceName}/status-stream",
    tag = "Evolution",
    summary = "Per-instance status stream",
    description = "Opens a Server-Sent Events stream that relays every webhook addressed to the instance, verbatim. A new stream for the same instance takes over delivery from the previous one.",
    params(
        ("instanceName" = String, Path, description = "Instance to listen to"),
    ),
    responses(
        (status = 200, description = "Event stream opened", content_type = "text/event-stream", body = String),
    )
)]
pub async fn instance_status_stream(
    State(state): State<AppState>,
    Path(instance_name): Path<String>,
) -> impl IntoResponse {
    let ack = InstanceAck::connected(instance_name.as_str());
    let subscription = state
        .event_bus
        .subscribe(SubscriberKey::Instance(instance_name.clone()), &ack);
    tracing::info!(
        instance = %instance_name,
        subscriber = %subscription.id(),
        "instance listener connected"
    );
    sse_response(subscription, state.sse_keep_alive)
}
