//! toolgate server entry point.
//!
//! Starts the Axum HTTP server with the tool routes, the SSE streams and the
//! webhook ingest endpoints.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use toolgate::api;
use toolgate::app_state::AppState;
use toolgate::config::GatewayConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env().context("invalid LISTEN_ADDR")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(addr = %config.listen_addr, "starting toolgate");
    if config.searxng_url.is_none() {
        tracing::warn!("SEARXNG_URL not set; web search will answer with a configuration error");
    }

    // Build application state
    let http_client = reqwest::Client::builder()
        .user_agent(concat!("toolgate/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;
    let app_state = AppState::from_config(&config, http_client);

    // Build router
    let app = api::build_router(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(
        addr = %config.listen_addr,
        public_url = config.public_server_url.as_deref().unwrap_or("-"),
        "server listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
