//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to an HTTP status code and a JSON body. Only validation and
//! configuration problems ever reach the direct caller; failed deliveries to
//! event subscribers are never reported as errors.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Error body returned by tool endpoints.
///
/// ```json
/// { "status": "error", "message": "El parámetro 'query' es requerido." }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `"error"`.
    pub status: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// Error body returned by the global webhook endpoint.
///
/// ```json
/// { "error": "El parámetro \"source\" es requerido en la URL." }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Server-side error enum with HTTP status code mapping.
///
/// | Variant                | HTTP Status |
/// |------------------------|-------------|
/// | `InvalidRequest`       | 400         |
/// | `MissingWebhookSource` | 400         |
/// | `NotConfigured`        | 500         |
/// | `Upstream`             | 500         |
/// | `Internal`             | 500         |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("{0}")]
    InvalidRequest(String),

    /// Global webhook called without its `source` query parameter.
    #[error("El parámetro \"source\" es requerido en la URL.")]
    MissingWebhookSource,

    /// A downstream service address or credential is absent.
    #[error("{0}")]
    NotConfigured(String),

    /// A downstream service failed or returned an unusable response.
    #[error("{0}")]
    Upstream(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::MissingWebhookSource => StatusCode::BAD_REQUEST,
            Self::NotConfigured(_) | Self::Upstream(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let mut response = match self {
            Self::MissingWebhookSource => Json(WebhookErrorResponse {
                error: self.to_string(),
            })
            .into_response(),
            _ => Json(ErrorResponse {
                status: "error",
                message: self.to_string(),
            })
            .into_response(),
        };
        *response.status_mut() = status;
        response
    }
}
