//! Mixpanel MCP server
//!
//! Exposes Mixpanel's analytics, ingestion, export, management and GDPR REST
//! APIs as Model Context Protocol tools. Each tool call carries its own
//! tenant credentials and maps onto exactly one Mixpanel HTTP request.
//!
//! # Architecture
//!
//! - **Server**: Axum HTTP server with a JSON-RPC `POST /mcp` endpoint, or a
//!   stdio loop for local clients
//! - **MCP**: protocol dispatch, tool registry and result envelope
//! - **Tools**: declarative table of the Mixpanel tools and their schemas
//! - **Mixpanel**: per-tenant credentials, endpoint selection and the client
//!
//! # Modules
//!
//! - [`config`]: layered configuration (defaults, file, env, CLI)
//! - [`mcp`]: MCP protocol, transports and tool registry
//! - [`mixpanel`]: Mixpanel REST client
//! - [`server`]: HTTP router
//! - [`telemetry`]: logging setup

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod config;
pub mod mcp;
pub mod mixpanel;
pub mod server;
pub mod telemetry;
mod tools;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::mcp::{McpService, ToolRegistry};
use crate::mixpanel::build_http_client;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// MCP dispatch: tool registry plus shared HTTP transport.
    pub mcp: Arc<McpService>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build the shared state: one pooled HTTP client, the configured
    /// endpoint table and the full tool registry.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let http = build_http_client(&config.http.settings())?;
        let endpoints = Arc::new(config.mixpanel.endpoints.clone());
        let mcp = McpService::new(ToolRegistry::mixpanel(), http, endpoints);
        Ok(Self {
            mcp: Arc::new(mcp),
            config: Arc::new(config),
        })
    }
}
