//! Uniform success/error envelope returned by every tool call.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use serde_json::Value;

use crate::mixpanel::MixpanelError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
}

impl ToolEnvelope {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_type: None,
            retry_after_seconds: None,
        }
    }

    pub fn failure(error: &MixpanelError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            error_type: Some(error.kind()),
            retry_after_seconds: error.retry_after().map(|d| d.as_secs()),
        }
    }

    /// Error envelope for failures outside the Mixpanel client, such as an
    /// unknown tool name.
    pub fn message(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            error_type: Some(kind),
            retry_after_seconds: None,
        }
    }

    pub fn from_result(result: crate::mixpanel::Result<Value>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::failure(&e),
        }
    }

    /// Wrap as an MCP tool result: one text content holding the JSON
    /// envelope, with `isError` mirroring `success`.
    pub fn into_call_result(self) -> CallToolResult {
        let text = serde_json::to_string_pretty(&self)
            .unwrap_or_else(|e| format!(r#"{{"success":false,"error":"{e}"}}"#));
        if self.success {
            CallToolResult::success(vec![Content::text(text)])
        } else {
            CallToolResult::error(vec![Content::text(text)])
        }
    }
}
