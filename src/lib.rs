//! # toolgate
//!
//! Multi-tool HTTP gateway for language-model agents, with a real-time
//! event relay.
//!
//! Each tool is one HTTP route in front of an external service. Around the
//! tools sits the relay: a global monitor stream that mirrors every HTTP
//! exchange and every ingested webhook, and per-instance status streams that
//! receive webhooks addressed to one WhatsApp session.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, SSE)            External systems (webhooks)
//!     │                                  │
//!     ├── Exchange interceptor (api/) ───┤
//!     ├── Tool handlers (api/)           ├── Webhook ingest (api/)
//!     ├── SSE endpoints (sse/)           │
//!     │                                  │
//!     ├── SearchService (service/)       │
//!     └── EventBus (domain/) ◄───────────┘
//!           ├── MonitorRegistry
//!           └── InstanceRegistry
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod sse;
