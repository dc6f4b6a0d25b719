//! System endpoint DTOs.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"`.
    pub status: String,
    /// Current server time (RFC 3339).
    pub timestamp: String,
    /// Crate version.
    pub version: String,
    /// Connected global monitor subscribers.
    pub monitor_subscribers: usize,
    /// Instances that currently have a status-stream listener.
    pub instance_listeners: Vec<String>,
}

/// Root index response.
#[derive(Debug, Serialize, ToSchema)]
pub struct IndexResponse {
    /// Always `"online"`.
    pub status: &'static str,
    /// Human-readable banner.
    pub message: &'static str,
    /// Tool name to documentation URL.
    #[schema(value_type = Object)]
    pub available_tools: BTreeMap<&'static str, &'static str>,
}
