use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use mixpanel_mcp::AppState;
use mixpanel_mcp::config::{
    AppConfig, HttpConfig, LogFormat, LoggingConfig, MixpanelConfig, ServerConfig, Transport,
};
use mixpanel_mcp::mcp::{McpService, ToolRegistry};
use mixpanel_mcp::mixpanel::Endpoints;
use mixpanel_mcp::server::{SESSION_HEADER, router};
use mockito::Matcher;
use serde_json::{Value, json};

fn state(endpoints: Endpoints) -> AppState {
    let config = AppConfig {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".into(),
            transport: Transport::Http,
        },
        mixpanel: MixpanelConfig {
            endpoints: endpoints.clone(),
        },
        http: HttpConfig {
            timeout_secs: Some(5),
            user_agent: "mixpanel-mcp-test".into(),
        },
        logging: LoggingConfig {
            format: LogFormat::Pretty,
        },
    };
    let mcp = McpService::new(
        ToolRegistry::mixpanel(),
        reqwest::Client::new(),
        Arc::new(endpoints),
    );
    AppState {
        mcp: Arc::new(mcp),
        config: Arc::new(config),
    }
}

fn test_server(endpoints: Endpoints) -> TestServer {
    TestServer::new(router(state(endpoints))).unwrap()
}

fn offline() -> TestServer {
    test_server(Endpoints::rooted_at("http://127.0.0.1:9"))
}

fn header(name: &'static str, value: &'static str) -> (HeaderName, HeaderValue) {
    (HeaderName::from_static(name), HeaderValue::from_static(value))
}

/// The envelope is carried as pretty JSON in the first text content block.
fn envelope(body: &Value) -> Value {
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = offline().get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn test_initialize_negotiates_and_sets_session() {
    let response = offline()
        .post("/mcp")
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-03-26",
                "capabilities": {},
                "clientInfo": {"name": "test", "version": "0"}
            }
        }))
        .await;

    response.assert_status_ok();
    let session = response.header(SESSION_HEADER);
    assert!(uuid::Uuid::parse_str(session.to_str().unwrap()).is_ok());

    let body: Value = response.json();
    assert_eq!(body["id"], 1);
    assert_eq!(body["result"]["protocolVersion"], "2025-03-26");
    assert!(body["result"]["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn test_tools_list() {
    let response = offline()
        .post("/mcp")
        .json(&json!({"jsonrpc": "2.0", "id": "list", "method": "tools/list"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let tools = body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 58);
    let profile_set = tools.iter().find(|t| t["name"] == "profile_set").unwrap();
    assert_eq!(profile_set["inputSchema"]["type"], "object");
}

#[tokio::test]
async fn test_notification_is_accepted_without_body() {
    let response = offline()
        .post("/mcp")
        .json(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
        .await;

    response.assert_status(StatusCode::ACCEPTED);
    assert!(response.text().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let response = offline()
        .post("/mcp")
        .text("{not json")
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], -32700);
}

#[tokio::test]
async fn test_tool_call_without_credentials() {
    let response = offline()
        .post("/mcp")
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": {"name": "list_funnels", "arguments": {}}
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body.get("error").is_none());
    assert_eq!(body["result"]["isError"], true);

    let envelope = envelope(&body);
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["errorType"], "missing_credentials");
    let message = envelope["error"].as_str().unwrap();
    assert!(message.contains("x-mixpanel-username"));
    assert!(message.contains("x-mixpanel-project-id"));
}

#[tokio::test]
async fn test_tool_call_with_invalid_arguments() {
    let (user_name, user) = header("x-mixpanel-username", "svc");
    let (secret_name, secret) = header("x-mixpanel-secret", "shh");
    let (project_name, project) = header("x-mixpanel-project-id", "123");

    let response = offline()
        .post("/mcp")
        .add_header(user_name, user)
        .add_header(secret_name, secret)
        .add_header(project_name, project)
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "tools/call",
            "params": {
                "name": "query_insights",
                "arguments": {"fromDate": "2024-02-01", "toDate": "2024-01-01", "event": "Signup"}
            }
        }))
        .await;

    let envelope = envelope(&response.json::<Value>());
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["errorType"], "invalid_input");
}

#[tokio::test]
async fn test_tool_call_reaches_mixpanel_with_tenant_credentials() {
    let mut mixpanel = mockito::Server::new_async().await;
    let mock = mixpanel
        .mock("GET", "/eu/query/funnels/list")
        .match_query(Matcher::UrlEncoded("project_id".into(), "777".into()))
        .match_header("authorization", "Basic c3ZjOnNoaA==")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"funnel_id":1,"name":"Onboarding"}]"#)
        .expect(1)
        .create_async()
        .await;

    let (user_name, user) = header("x-mixpanel-username", "svc");
    let (secret_name, secret) = header("x-mixpanel-secret", "shh");
    let (project_name, project) = header("x-mixpanel-project-id", "777");
    let (eu_name, eu) = header("x-mixpanel-eu-resident", "true");

    let response = test_server(Endpoints::rooted_at(&mixpanel.url()))
        .post("/mcp")
        .add_header(user_name, user)
        .add_header(secret_name, secret)
        .add_header(project_name, project)
        .add_header(eu_name, eu)
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "tools/call",
            "params": {"name": "list_funnels", "arguments": {}}
        }))
        .await;

    mock.assert_async().await;
    let body: Value = response.json();
    assert_eq!(body["result"]["isError"], false);
    let envelope = envelope(&body);
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["data"][0]["name"], "Onboarding");
}

#[tokio::test]
async fn test_rate_limit_surfaces_retry_after() {
    let mut mixpanel = mockito::Server::new_async().await;
    mixpanel
        .mock("GET", "/query/funnels/list")
        .match_query(Matcher::Any)
        .with_status(429)
        .with_header("retry-after", "5")
        .create_async()
        .await;

    let (user_name, user) = header("x-mixpanel-username", "svc");
    let (secret_name, secret) = header("x-mixpanel-secret", "shh");
    let (project_name, project) = header("x-mixpanel-project-id", "1");

    let response = test_server(Endpoints::rooted_at(&mixpanel.url()))
        .post("/mcp")
        .add_header(user_name, user)
        .add_header(secret_name, secret)
        .add_header(project_name, project)
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 6,
            "method": "tools/call",
            "params": {"name": "list_funnels"}
        }))
        .await;

    let envelope = envelope(&response.json::<Value>());
    assert_eq!(envelope["errorType"], "rate_limited");
    assert_eq!(envelope["retryAfterSeconds"], 5);
}
