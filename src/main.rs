//! Mixpanel MCP server
//!
//! Entry point: loads configuration, sets up logging and serves MCP over
//! HTTP or stdio.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use mixpanel_mcp::config::{AppConfig, Transport};
use mixpanel_mcp::{AppState, mcp, server, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) before config reads the environment
    let _ = dotenv();

    let config = AppConfig::load().context("failed to load configuration")?;
    telemetry::init(config.logging.format, config.server.transport);

    info!(
        name: "config.loaded",
        transport = ?config.server.transport,
        timeout_secs = ?config.http.timeout_secs,
        "Configuration loaded"
    );

    let transport = config.server.transport;
    let state = AppState::new(config).context("failed to initialize application state")?;

    match transport {
        Transport::Http => server::start_server(state).await,
        Transport::Stdio => mcp::stdio::serve_stdio(&state.mcp)
            .await
            .context("stdio transport failed"),
    }
}
