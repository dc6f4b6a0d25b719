//! Webhook ingest DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters of `POST /api/webhook`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WebhookParams {
    /// Identifier of the system sending the notification.
    #[serde(default)]
    pub source: Option<String>,
}

impl WebhookParams {
    /// Builds the parameters from raw query pairs.
    ///
    /// A repeated `source` resolves to its first non-empty value.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let source = pairs
            .into_iter()
            .find(|(key, value)| key == "source" && !value.is_empty())
            .map(|(_, value)| value);
        Self { source }
    }
}

/// Acknowledgement returned by `POST /api/webhook`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WebhookAccepted {
    /// Always `"success"`.
    pub status: &'static str,
    /// Human-readable confirmation.
    pub message: &'static str,
}

impl WebhookAccepted {
    /// The fixed acknowledgement body.
    #[must_use]
    pub const fn broadcasted() -> Self {
        Self {
            status: "success",
            message: "Webhook event received and broadcasted.",
        }
    }
}

/// Plain-text acknowledgement returned by `POST /api/evolution/webhook`.
pub const EVOLUTION_WEBHOOK_ACK: &str = "Webhook received";
