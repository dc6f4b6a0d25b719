//! Web search tool: `POST /api/search/web-search`.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{WebSearchRequest, WebSearchResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /api/search/web-search` — Search the web through SearXNG.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] without a query or with a body
/// that is not a valid request, and a configuration or upstream error when
/// SearXNG is unavailable.
#[utoipa::path(
    post,
    path = "/api/search/web-search",
    tag = "Search",
    summary = "Web search",
    description = "Queries SearXNG and returns the first `count` results (title, url, content).",
    request_body = WebSearchRequest,
    responses(
        (status = 200, description = "Search completed", body = WebSearchResponse),
        (status = 400, description = "Missing query", body = ErrorResponse),
        (status = 500, description = "Search service unavailable", body = ErrorResponse),
    )
)]
pub async fn web_search(
    State(state): State<AppState>,
    payload: Result<Json<WebSearchRequest>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let req = match payload {
        Ok(Json(req)) => req,
        // A body without a JSON content type carries no fields at all.
        Err(JsonRejection::MissingJsonContentType(_)) => WebSearchRequest::default(),
        Err(rejection) => return Err(GatewayError::InvalidRequest(rejection.body_text())),
    };
    let Some(query) = req.query.filter(|q| !q.trim().is_empty()) else {
        return Err(GatewayError::InvalidRequest(
            "El parámetro 'query' es requerido.".to_string(),
        ));
    };

    let response = state.search_service.web_search(&query, req.count).await?;
    Ok(Json(response))
}

/// Search routes, mounted under `/api/search`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/web-search", post(web_search))
}
