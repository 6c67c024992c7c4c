//! Model Context Protocol (MCP) server.
//!
//! This module speaks JSON-RPC 2.0 MCP over two transports and dispatches
//! `tools/call` to the Mixpanel tool table.
//!
//! # Transports
//!
//! - HTTP: `POST /mcp` (see [`crate::server`]), credentials from
//!   `x-mixpanel-*` request headers
//! - stdio: newline-delimited JSON-RPC, credentials from `MIXPANEL_*`
//!   environment variables
//!
//! # Tool results
//!
//! Every `tools/call` returns a `CallToolResult` whose text content is a JSON
//! envelope:
//!
//! ```json
//! { "success": true, "data": { ... } }
//! { "success": false, "error": "Rate limited ...", "errorType": "rate_limited", "retryAfterSeconds": 60 }
//! ```

pub mod envelope;
pub mod handler;
pub mod protocol;
pub mod registry;
pub mod stdio;

pub use envelope::ToolEnvelope;
pub use handler::{CredentialSource, McpService};
pub use registry::{ToolRegistry, ToolSpec};
