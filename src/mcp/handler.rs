//! MCP method dispatch, shared by the HTTP and stdio transports.

use std::sync::Arc;

use axum::http::HeaderMap;
use serde_json::{Value, json};

use super::envelope::ToolEnvelope;
use super::protocol::{JsonRpcRequest, JsonRpcResponse, ProtocolError, initialize_result};
use super::registry::ToolRegistry;
use crate::mixpanel::{Endpoints, MixpanelClient, TenantCredentials};

/// Where a call's tenant credentials come from.
#[derive(Debug, Clone, Copy)]
pub enum CredentialSource<'a> {
    /// `x-mixpanel-*` headers on the inbound HTTP request.
    Headers(&'a HeaderMap),
    /// `MIXPANEL_*` environment variables (stdio transport).
    Environment,
}

impl CredentialSource<'_> {
    fn resolve(self) -> crate::mixpanel::Result<TenantCredentials> {
        match self {
            Self::Headers(headers) => TenantCredentials::from_headers(headers),
            Self::Environment => TenantCredentials::from_env(),
        }
    }
}

/// Stateless MCP server core: the tool table plus the shared transport
/// pieces every per-tenant client is built from.
#[derive(Debug, Clone)]
pub struct McpService {
    registry: ToolRegistry,
    http: reqwest::Client,
    endpoints: Arc<Endpoints>,
}

impl McpService {
    pub fn new(registry: ToolRegistry, http: reqwest::Client, endpoints: Arc<Endpoints>) -> Self {
        Self {
            registry,
            http,
            endpoints,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Client bound to one tenant. Cheap: the connection pool and endpoint
    /// table are shared.
    pub fn client_for(&self, credentials: TenantCredentials) -> MixpanelClient {
        MixpanelClient::new(self.http.clone(), Arc::clone(&self.endpoints), credentials)
    }

    /// Handle one JSON-RPC message. Returns `None` for notifications.
    pub async fn handle(
        &self,
        request: JsonRpcRequest,
        credentials: CredentialSource<'_>,
    ) -> Option<JsonRpcResponse> {
        let result = if request.jsonrpc == "2.0" {
            self.dispatch(&request, credentials).await
        } else {
            Err(ProtocolError::InvalidVersion(request.jsonrpc.clone()))
        };

        let Some(id) = request.id else {
            if let Err(e) = result {
                tracing::warn!(method = %request.method, error = %e, "Notification handling failed");
            }
            return None;
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => {
                tracing::debug!(method = %request.method, error = %e, "JSON-RPC error");
                JsonRpcResponse::error(id, e.into())
            }
        })
    }

    async fn dispatch(
        &self,
        request: &JsonRpcRequest,
        credentials: CredentialSource<'_>,
    ) -> Result<Value, ProtocolError> {
        match request.method.as_str() {
            "initialize" => Ok(initialize_result(&request.params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.registry.tools() })),
            "tools/call" => self.call_tool(&request.params, credentials).await,
            method if method.starts_with("notifications/") => Ok(Value::Null),
            method => Err(ProtocolError::MethodNotFound(method.to_string())),
        }
    }

    async fn call_tool(
        &self,
        params: &Value,
        credentials: CredentialSource<'_>,
    ) -> Result<Value, ProtocolError> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ProtocolError::InvalidParams("missing 'name' parameter".into()))?;
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        let envelope = match credentials.resolve() {
            Ok(credentials) => {
                tracing::debug!(
                    tool = name,
                    username = %credentials.username(),
                    project_id = %credentials.project_id(),
                    eu = credentials.eu_resident(),
                    "Dispatching tool call"
                );
                let client = self.client_for(credentials);
                self.registry.call(&client, name, arguments).await
            }
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "Rejected tool call without credentials");
                ToolEnvelope::failure(&e)
            }
        };

        Ok(serde_json::to_value(envelope.into_call_result())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn service() -> McpService {
        McpService::new(
            ToolRegistry::mixpanel(),
            reqwest::Client::new(),
            Arc::new(Endpoints::rooted_at("http://127.0.0.1:9")),
        )
    }

    fn request(value: Value) -> JsonRpcRequest {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_tools_list_needs_no_credentials() {
        let headers = HeaderMap::new();
        let response = service()
            .handle(
                request(json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"})),
                CredentialSource::Headers(&headers),
            )
            .await
            .unwrap();
        let tools = response.result.unwrap()["tools"].as_array().unwrap().len();
        assert_eq!(tools, 58);
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let headers = HeaderMap::new();
        let response = service()
            .handle(
                request(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})),
                CredentialSource::Headers(&headers),
            )
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let headers = HeaderMap::new();
        let response = service()
            .handle(
                request(json!({"jsonrpc": "2.0", "id": 7, "method": "resources/list"})),
                CredentialSource::Headers(&headers),
            )
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_call_without_credentials_is_error_envelope() {
        let mut headers = HeaderMap::new();
        headers.insert("x-mixpanel-username", HeaderValue::from_static("svc"));
        let response = service()
            .handle(
                request(json!({
                    "jsonrpc": "2.0",
                    "id": 2,
                    "method": "tools/call",
                    "params": {"name": "list_funnels", "arguments": {}}
                })),
                CredentialSource::Headers(&headers),
            )
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        let envelope: Value = serde_json::from_str(text).unwrap();
        assert_eq!(envelope["success"], false);
        assert!(
            envelope["error"]
                .as_str()
                .unwrap()
                .contains("x-mixpanel-secret")
        );
    }

    #[tokio::test]
    async fn test_call_without_name_is_invalid_params() {
        let headers = HeaderMap::new();
        let response = service()
            .handle(
                request(json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {}})),
                CredentialSource::Headers(&headers),
            )
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32602);
    }
}
