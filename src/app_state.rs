//! Shared application state injected into all Axum handlers.

use std::time::Duration;

use crate::config::GatewayConfig;
use crate::domain::EventBus;
use crate::service::SearchService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Broadcast bus owning the monitor and per-instance registries.
    pub event_bus: EventBus,
    /// Web search tool.
    pub search_service: SearchService,
    /// Largest JSON request body copied into `request` events.
    pub monitor_body_limit: usize,
    /// SSE keep-alive interval, if enabled.
    pub sse_keep_alive: Option<Duration>,
}

impl AppState {
    /// Builds the state from configuration with a fresh, empty event bus.
    #[must_use]
    pub fn from_config(config: &GatewayConfig, http_client: reqwest::Client) -> Self {
        Self {
            event_bus: EventBus::new(config.sse_buffer_capacity),
            search_service: SearchService::new(http_client, config.searxng_url.clone()),
            monitor_body_limit: config.monitor_body_limit,
            sse_keep_alive: config.sse_keep_alive,
        }
    }
}
