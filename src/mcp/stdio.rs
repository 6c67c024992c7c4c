//! Newline-delimited JSON-RPC over stdin/stdout.
//!
//! Credentials are read from the `MIXPANEL_*` environment on every call.
//! Logs must go to stderr while this transport is active.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::handler::{CredentialSource, McpService};
use super::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};

/// Serve MCP on the process's stdin/stdout until stdin closes.
pub async fn serve_stdio(service: &McpService) -> std::io::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(service, stdin, stdout).await
}

/// Serve MCP over any line-oriented reader/writer pair.
pub async fn serve<R, W>(service: &McpService, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    tracing::info!(name: "mcp.stdio.started", "MCP stdio transport started");
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => {
                tracing::debug!(method = %request.method, id = ?request.id, "Incoming JSON-RPC request");
                service.handle(request, CredentialSource::Environment).await
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse JSON-RPC request");
                Some(JsonRpcResponse::error(
                    Value::Null,
                    JsonRpcError::new(JsonRpcError::PARSE_ERROR, e.to_string()),
                ))
            }
        };

        if let Some(response) = response {
            let mut json = serde_json::to_vec(&response)?;
            json.push(b'\n');
            writer.write_all(&json).await?;
            writer.flush().await?;
        }
    }

    tracing::info!(name: "mcp.stdio.stopped", "stdin closed, MCP stdio transport stopping");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::registry::ToolRegistry;
    use crate::mixpanel::Endpoints;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_serve_answers_requests_and_skips_notifications() {
        let service = McpService::new(
            ToolRegistry::mixpanel(),
            reqwest::Client::new(),
            Arc::new(Endpoints::default()),
        );
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26"}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            "not json\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
            "\n"
        );
        let mut output = Vec::new();
        serve(&service, input.as_bytes(), &mut output).await.unwrap();

        let responses: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["result"]["protocolVersion"], "2025-03-26");
        assert_eq!(responses[1]["error"]["code"], -32700);
        assert_eq!(responses[2]["id"], 2);
    }
}
