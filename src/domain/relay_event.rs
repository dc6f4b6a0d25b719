//! Events broadcast to global monitor subscribers.
//!
//! Every [`RelayEvent`] serializes to a JSON object whose `type` field
//! discriminates the variant. Events are immutable once built and are
//! serialized once per broadcast, no matter how many subscribers receive them.
//!
//! Per-instance relays do not use this type: webhook payloads addressed to an
//! instance are forwarded as the raw JSON the external system sent.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Status reported by the monitor stream's opening acknowledgement.
pub const CONNECTION_ESTABLISHED: &str = "established";

/// Event delivered on the global monitor stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayEvent {
    /// First frame written to every new monitor stream.
    Connection {
        /// Always [`CONNECTION_ESTABLISHED`].
        status: String,
    },

    /// An inbound HTTP request, emitted before its handler runs.
    Request {
        /// HTTP method.
        method: String,
        /// Path and query as received.
        url: String,
        /// JSON body, present only when the request carried a non-empty one.
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<serde_json::Value>,
        /// Emission time.
        timestamp: DateTime<Utc>,
    },

    /// Completion of an HTTP exchange, emitted once the response body ends.
    Response {
        /// HTTP method of the originating request.
        method: String,
        /// Path and query of the originating request.
        url: String,
        /// Final HTTP status code.
        status: u16,
        /// Milliseconds between request arrival and response completion.
        duration_ms: u64,
        /// Emission time.
        timestamp: DateTime<Utc>,
    },

    /// A notification received on the global webhook endpoint.
    WebhookEvent {
        /// Caller-supplied source tag.
        source: String,
        /// Payload exactly as received.
        payload: serde_json::Value,
        /// Emission time.
        timestamp: DateTime<Utc>,
    },
}

impl RelayEvent {
    /// The monitor stream acknowledgement.
    #[must_use]
    pub fn connection_established() -> Self {
        Self::Connection {
            status: CONNECTION_ESTABLISHED.to_string(),
        }
    }

    /// Builds a `request` event stamped now.
    #[must_use]
    pub fn request(
        method: impl Into<String>,
        url: impl Into<String>,
        body: Option<serde_json::Value>,
    ) -> Self {
        Self::Request {
            method: method.into(),
            url: url.into(),
            body,
            timestamp: Utc::now(),
        }
    }

    /// Builds a `response` event stamped now.
    #[must_use]
    pub fn response(
        method: impl Into<String>,
        url: impl Into<String>,
        status: u16,
        duration_ms: u64,
    ) -> Self {
        Self::Response {
            method: method.into(),
            url: url.into(),
            status,
            duration_ms,
            timestamp: Utc::now(),
        }
    }

    /// Builds a `webhook_event` stamped now.
    #[must_use]
    pub fn webhook(source: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::WebhookEvent {
            source: source.into(),
            payload,
            timestamp: Utc::now(),
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection",
            Self::Request { .. } => "request",
            Self::Response { .. } => "response",
            Self::WebhookEvent { .. } => "webhook_event",
        }
    }
}

/// Opening acknowledgement of a per-instance status stream.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceAck {
    /// Always `"connected"`.
    pub status: &'static str,
    /// Instance the stream listens to.
    pub instance_name: String,
}

impl InstanceAck {
    /// Acknowledgement for `instance_name`.
    #[must_use]
    pub fn connected(instance_name: impl Into<String>) -> Self {
        Self {
            status: "connected",
            instance_name: instance_name.into(),
        }
    }
}
