use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::mcp::CredentialSource;
use crate::mcp::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};

/// Session header returned on `initialize`. The server keeps no session
/// state; the id only lets clients correlate their own requests.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Request body limit for `POST /mcp`. Lookup-table uploads are the largest
/// payloads.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the HTTP router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/mcp", post(mcp_post))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve MCP over HTTP until the process is stopped.
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        tools = state.mcp.registry().len(),
        "Server started"
    );

    axum::serve(listener, router(state).into_make_service()).await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /health - Liveness probe.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /mcp - One JSON-RPC message per request.
///
/// Notifications are acknowledged with `202 Accepted` and no body.
async fn mcp_post(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse JSON-RPC request");
            let response = JsonRpcResponse::error(
                Value::Null,
                JsonRpcError::new(JsonRpcError::PARSE_ERROR, e.to_string()),
            );
            return (StatusCode::BAD_REQUEST, Json(response)).into_response();
        }
    };

    let is_initialize = request.method == "initialize";
    tracing::debug!(method = %request.method, id = ?request.id, "Incoming JSON-RPC request");

    match state
        .mcp
        .handle(request, CredentialSource::Headers(&headers))
        .await
    {
        None => StatusCode::ACCEPTED.into_response(),
        Some(response) => {
            let mut http = Json(response).into_response();
            if is_initialize {
                let session = uuid::Uuid::new_v4().to_string();
                if let Ok(value) = HeaderValue::from_str(&session) {
                    http.headers_mut().insert(SESSION_HEADER, value);
                }
            }
            http
        }
    }
}
