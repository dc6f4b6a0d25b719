//! REST endpoint handlers organized by tool.

pub mod evolution;
pub mod search;
pub mod system;
pub mod webhook;

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;
use crate::sse::MONITOR_STREAM_PATH;
use crate::sse::handler::monitor_stream;

/// Composes all tool routes under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(webhook::routes())
        .nest("/search", search::routes())
        .nest("/evolution", evolution::routes())
}

/// The global monitor stream route.
pub fn monitor_routes() -> Router<AppState> {
    Router::new().route(MONITOR_STREAM_PATH, get(monitor_stream))
}
