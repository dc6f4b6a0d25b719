//! OpenAPI document covering every gateway route.

use utoipa::OpenApi;

use super::dto::{
    HealthResponse, IndexResponse, SearchHit, SearchResults, WebSearchRequest, WebSearchResponse,
    WebhookAccepted,
};
use super::handlers::{evolution, search, system, webhook};
use crate::error::{ErrorResponse, WebhookErrorResponse};
use crate::sse::handler as sse_handler;

/// Generated OpenAPI 3.1 description of the gateway.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "toolgate",
        description = "Multi-tool HTTP gateway for language-model agents, with a real-time event monitor and webhook relay."
    ),
    paths(
        system::index_handler,
        system::health_handler,
        sse_handler::monitor_stream,
        sse_handler::instance_status_stream,
        webhook::receive_webhook,
        evolution::receive_instance_webhook,
        search::web_search,
    ),
    components(schemas(
        ErrorResponse,
        WebhookErrorResponse,
        WebhookAccepted,
        HealthResponse,
        IndexResponse,
        WebSearchRequest,
        WebSearchResponse,
        SearchResults,
        SearchHit,
    )),
    tags(
        (name = "System", description = "Service status and documentation"),
        (name = "Monitor", description = "Global event stream and webhook ingest"),
        (name = "Evolution", description = "Per-instance WhatsApp status relay"),
        (name = "Search", description = "Web search tool"),
    )
)]
pub struct ApiDoc;
