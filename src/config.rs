//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Downstream service addresses are
//! optional here; a tool whose service is not configured answers with a
//! configuration error instead of preventing startup.

use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::DEFAULT_SUBSCRIBER_CAPACITY;

/// Default port when neither `LISTEN_ADDR` nor `PORT` is set.
const DEFAULT_PORT: u16 = 5005;

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:5005`).
    pub listen_addr: SocketAddr,

    /// Externally reachable base URL, only used for logging.
    pub public_server_url: Option<String>,

    /// SearXNG JSON endpoint used by the web search tool.
    pub searxng_url: Option<String>,

    /// Largest JSON request body (bytes) copied into `request` events.
    pub monitor_body_limit: usize,

    /// Interval between SSE keep-alive comments; `None` disables them.
    pub sse_keep_alive: Option<Duration>,

    /// Frames buffered per stream before further frames are dropped for it.
    pub sse_buffer_capacity: usize,

    /// Emit logs as JSON lines instead of the human-readable format.
    pub log_json: bool,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, std::net::AddrParseError> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = match std::env::var("LISTEN_ADDR") {
            Ok(addr) => addr.parse()?,
            Err(_) => SocketAddr::from(([0, 0, 0, 0], parse_env("PORT", DEFAULT_PORT))),
        };

        let monitor_body_limit = parse_env("MONITOR_BODY_LIMIT", 1024 * 1024);
        let keep_alive_secs: u64 = parse_env("SSE_KEEP_ALIVE_SECS", 0);
        let sse_buffer_capacity =
            match parse_env("SSE_BUFFER_CAPACITY", DEFAULT_SUBSCRIBER_CAPACITY) {
                0 => DEFAULT_SUBSCRIBER_CAPACITY,
                n => n,
            };

        Ok(Self {
            listen_addr,
            public_server_url: non_empty_env("PUBLIC_SERVER_URL"),
            searxng_url: non_empty_env("SEARXNG_URL"),
            monitor_body_limit,
            sse_keep_alive: (keep_alive_secs > 0).then(|| Duration::from_secs(keep_alive_secs)),
            sse_buffer_capacity,
            log_json: parse_env_bool("LOG_JSON", false),
        })
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            public_server_url: None,
            searxng_url: None,
            monitor_body_limit: 1024 * 1024,
            sse_keep_alive: None,
            sse_buffer_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
            log_json: false,
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().map(|v| v.to_ascii_lowercase()).as_deref() {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}

/// Reads an environment variable, treating blank values as unset.
fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
