use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use rmcp::model::Tool;
use serde_json::Value;

use super::envelope::ToolEnvelope;
use crate::mixpanel::{MixpanelClient, Result};

/// Future returned by a tool handler, borrowing the tenant client.
pub type ToolFuture<'a> = BoxFuture<'a, Result<Value>>;

/// Deserializes and validates the arguments, then runs one client operation.
pub type ToolHandler = for<'a> fn(&'a MixpanelClient, Value) -> ToolFuture<'a>;

/// One statically declared tool.
#[derive(Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: fn() -> Value,
    pub handler: ToolHandler,
}

impl std::fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSpec")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ToolSpec {
    fn to_mcp_tool(&self) -> Tool {
        Tool {
            name: self.name.into(),
            description: Some(self.description.into()),
            input_schema: Arc::new(
                (self.schema)()
                    .as_object()
                    .cloned()
                    .unwrap_or_default(),
            ),
            title: None,
            output_schema: None,
            annotations: None,
            icons: None,
            meta: None,
        }
    }
}

/// Read-only tool table shared by every request.
#[derive(Clone)]
pub struct ToolRegistry {
    specs: Arc<Vec<ToolSpec>>,
    tools: Arc<Vec<Tool>>,
    // tool name -> index into specs/tools
    index: Arc<HashMap<&'static str, usize>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tool_count", &self.tools.len())
            .finish()
    }
}

impl ToolRegistry {
    /// Build a registry from a tool table. Later duplicates of a name are
    /// ignored.
    pub fn new(specs: Vec<ToolSpec>) -> Self {
        let mut index = HashMap::with_capacity(specs.len());
        let mut kept = Vec::with_capacity(specs.len());
        for spec in specs {
            if index.contains_key(spec.name) {
                tracing::warn!(tool = spec.name, "Duplicate tool name ignored");
                continue;
            }
            index.insert(spec.name, kept.len());
            kept.push(spec);
        }
        let tools = kept.iter().map(ToolSpec::to_mcp_tool).collect();
        Self {
            specs: Arc::new(kept),
            tools: Arc::new(tools),
            index: Arc::new(index),
        }
    }

    /// Registry holding every Mixpanel tool.
    pub fn mixpanel() -> Self {
        Self::new(crate::tools::all())
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Run a tool for one tenant and wrap the outcome in the envelope.
    pub async fn call(&self, client: &MixpanelClient, name: &str, arguments: Value) -> ToolEnvelope {
        let Some(spec) = self.index.get(name).map(|&i| &self.specs[i]) else {
            return ToolEnvelope::message("unknown_tool", format!("Unknown tool: {name}"));
        };

        let started = std::time::Instant::now();
        let result = (spec.handler)(client, arguments).await;
        let elapsed_ms = started.elapsed().as_millis();

        match &result {
            Ok(_) => tracing::info!(
                name: "mcp.tool.call",
                tool = name,
                project_id = %client.credentials().project_id(),
                elapsed_ms = %elapsed_ms,
                success = true,
                "Tool call completed"
            ),
            Err(e) => tracing::warn!(
                name: "mcp.tool.call",
                tool = name,
                project_id = %client.credentials().project_id(),
                elapsed_ms = %elapsed_ms,
                success = false,
                error_type = e.kind(),
                error = %e,
                "Tool call failed"
            ),
        }

        ToolEnvelope::from_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixpanel::{Endpoints, TenantCredentials};
    use serde_json::json;

    fn echo(_client: &MixpanelClient, args: Value) -> ToolFuture<'_> {
        Box::pin(async move { Ok(args) })
    }

    fn echo_schema() -> Value {
        json!({"type": "object", "properties": {}})
    }

    fn client() -> MixpanelClient {
        MixpanelClient::new(
            reqwest::Client::new(),
            Arc::new(Endpoints::default()),
            TenantCredentials::new("svc", "shh", "1"),
        )
    }

    fn echo_spec(description: &'static str) -> ToolSpec {
        ToolSpec {
            name: "echo",
            description,
            schema: echo_schema,
            handler: echo,
        }
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let registry = ToolRegistry::new(vec![echo_spec("first"), echo_spec("second")]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.tools()[0].description.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_call_wraps_result() {
        let registry = ToolRegistry::new(vec![echo_spec("echo")]);
        let env = registry.call(&client(), "echo", json!({"a": 1})).await;
        assert!(env.success);
        assert_eq!(env.data, Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_envelope() {
        let registry = ToolRegistry::new(vec![]);
        let env = registry.call(&client(), "nope", Value::Null).await;
        assert!(!env.success);
        assert_eq!(env.error_type, Some("unknown_tool"));
    }
}
