//! Server-Sent Events layer: subscription endpoints and response streams.
//!
//! Two endpoints share the same lifecycle: headers are sent as soon as the
//! handler returns, an acknowledgement frame is queued before the subscriber
//! is registered, and the subscriber is removed when axum drops the stream
//! on client disconnect.
//!
//! - `GET /api/events`: global monitor stream.
//! - `GET /api/evolution/instances/{instanceName}/status-stream`:
//!   per-instance relay stream.

pub mod handler;
pub mod stream;

/// Path of the global monitor stream. The exchange interceptor skips it.
pub const MONITOR_STREAM_PATH: &str = "/api/events";
