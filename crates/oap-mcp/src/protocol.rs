//! MCP method dispatch over JSON-RPC 2.0.
//!
//! [`McpServer`] is transport-agnostic: feed it one decoded message and send
//! back whatever it returns. Notifications and client responses yield `None`.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::catalog::ToolCatalog;

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

/// Protocol revisions this server speaks, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// Identity reported in the `initialize` result.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self { name: "oap-chatbot-mcp".into(), version: "1.0.0".into() }
    }
}

#[derive(Debug)]
pub struct McpServer {
    info: ServerInfo,
    catalog: ToolCatalog,
}

#[derive(Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

impl McpServer {
    pub fn new(info: ServerInfo, catalog: ToolCatalog) -> Self {
        Self { info, catalog }
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Handle a raw message body, reporting malformed JSON as a parse error.
    pub async fn handle_text(&self, body: &str) -> Option<Value> {
        match serde_json::from_str::<Value>(body) {
            Ok(message) => self.handle(message).await,
            Err(e) => {
                debug!(error = %e, "unparseable JSON-RPC message");
                Some(error_response(Value::Null, PARSE_ERROR, "Parse error"))
            }
        }
    }

    /// Handle one message or a batch.
    pub async fn handle(&self, message: Value) -> Option<Value> {
        match message {
            Value::Array(batch) if batch.is_empty() => Some(error_response(
                Value::Null,
                INVALID_REQUEST,
                "Invalid Request: empty batch",
            )),
            Value::Array(batch) => {
                let mut responses = Vec::new();
                for item in batch {
                    if let Some(response) = self.handle_single(item).await {
                        responses.push(response);
                    }
                }
                (!responses.is_empty()).then_some(Value::Array(responses))
            }
            other => self.handle_single(other).await,
        }
    }

    async fn handle_single(&self, message: Value) -> Option<Value> {
        let Value::Object(obj) = message else {
            return Some(error_response(Value::Null, INVALID_REQUEST, "Invalid Request"));
        };
        // Absent id means notification; an explicit null id is still a request.
        let id = obj.get("id").cloned();
        let Some(method) = obj.get("method").and_then(Value::as_str) else {
            if obj.contains_key("result") || obj.contains_key("error") {
                // A response from the client; nothing to answer.
                return None;
            }
            return Some(error_response(
                id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                "Invalid Request: missing method",
            ));
        };
        let params = obj.get("params").cloned().unwrap_or_else(|| json!({}));

        let Some(id) = id else {
            debug!(method, "notification received");
            return None;
        };

        debug!(method, "request received");
        let outcome = match method {
            "initialize" => Ok(self.initialize(&params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(params).await,
            other => {
                warn!(method = other, "unknown MCP method");
                Err((METHOD_NOT_FOUND, format!("Method not found: {other}")))
            }
        };
        Some(match outcome {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Err((code, message)) => error_response(id, code, &message),
        })
    }

    fn initialize(&self, params: &Value) -> Value {
        let requested = params.get("protocolVersion").and_then(Value::as_str);
        let version = requested
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
            .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);
        json!({
            "protocolVersion": version,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": { "name": self.info.name, "version": self.info.version },
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<Value> = self.catalog.iter().map(|t| t.descriptor()).collect();
        json!({ "tools": tools })
    }

    async fn call_tool(&self, params: Value) -> Result<Value, (i64, String)> {
        let CallParams { name, arguments } = serde_json::from_value(params)
            .map_err(|e| (INVALID_PARAMS, format!("Invalid params: {e}")))?;
        let result = self.catalog.call(&name, arguments).await;
        serde_json::to_value(result).map_err(|e| (INVALID_PARAMS, e.to_string()))
    }
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToolHandler;
    use crate::envelope::ToolResult;
    use crate::error::ToolError;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Hello;

    #[async_trait]
    impl ToolHandler for Hello {
        async fn call(&self, _args: Value) -> Result<ToolResult, ToolError> {
            Ok(ToolResult::text("hello"))
        }
    }

    fn server() -> McpServer {
        let mut catalog = ToolCatalog::new();
        catalog
            .register("hello", "Say hello", json!({ "type": "object" }), Arc::new(Hello))
            .unwrap();
        McpServer::new(ServerInfo::default(), catalog)
    }

    #[tokio::test]
    async fn initialize_reports_server_info() {
        let resp = server()
            .handle(json!({
                "jsonrpc": "2.0", "id": 1, "method": "initialize",
                "params": { "protocolVersion": "2024-11-05" }
            }))
            .await
            .unwrap();
        assert_eq!(resp["id"], 1);
        assert_eq!(resp["result"]["serverInfo"]["name"], "oap-chatbot-mcp");
        assert_eq!(resp["result"]["protocolVersion"], "2024-11-05");
    }

    #[tokio::test]
    async fn initialize_with_unknown_version_offers_latest() {
        let resp = server()
            .handle(json!({
                "jsonrpc": "2.0", "id": 1, "method": "initialize",
                "params": { "protocolVersion": "1999-01-01" }
            }))
            .await
            .unwrap();
        assert_eq!(resp["result"]["protocolVersion"], SUPPORTED_PROTOCOL_VERSIONS[0]);
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let resp = server()
            .handle(json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }))
            .await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn tools_list_includes_schema() {
        let resp = server()
            .handle(json!({ "jsonrpc": "2.0", "id": "a", "method": "tools/list" }))
            .await
            .unwrap();
        let tools = resp["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "hello");
        assert_eq!(tools[0]["inputSchema"]["type"], "object");
    }

    #[tokio::test]
    async fn tools_call_returns_envelope() {
        let resp = server()
            .handle(json!({
                "jsonrpc": "2.0", "id": 7, "method": "tools/call",
                "params": { "name": "hello" }
            }))
            .await
            .unwrap();
        assert_eq!(resp["result"]["content"][0]["text"], "hello");
        assert!(resp["result"].get("isError").is_none());
    }

    #[tokio::test]
    async fn tools_call_without_name_is_invalid_params() {
        let resp = server()
            .handle(json!({ "jsonrpc": "2.0", "id": 7, "method": "tools/call", "params": {} }))
            .await
            .unwrap();
        assert_eq!(resp["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn unknown_tool_is_a_tool_error_not_a_protocol_error() {
        let resp = server()
            .handle(json!({
                "jsonrpc": "2.0", "id": 2, "method": "tools/call",
                "params": { "name": "nope", "arguments": {} }
            }))
            .await
            .unwrap();
        assert_eq!(resp["result"]["isError"], true);
    }

    #[tokio::test]
    async fn unknown_method() {
        let resp = server()
            .handle(json!({ "jsonrpc": "2.0", "id": 3, "method": "resources/list" }))
            .await
            .unwrap();
        assert_eq!(resp["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(resp["id"], 3);
    }

    #[tokio::test]
    async fn parse_error() {
        let resp = server().handle_text("{not json").await.unwrap();
        assert_eq!(resp["error"]["code"], PARSE_ERROR);
        assert_eq!(resp["id"], Value::Null);
    }

    #[tokio::test]
    async fn missing_method_is_invalid_request() {
        let resp = server().handle(json!({ "jsonrpc": "2.0", "id": 4 })).await.unwrap();
        assert_eq!(resp["error"]["code"], INVALID_REQUEST);
        assert_eq!(resp["id"], 4);
    }

    #[tokio::test]
    async fn client_responses_are_ignored() {
        let resp = server()
            .handle(json!({ "jsonrpc": "2.0", "id": 4, "result": {} }))
            .await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn batch_skips_notifications() {
        let resp = server()
            .handle(json!([
                { "jsonrpc": "2.0", "id": 1, "method": "ping" },
                { "jsonrpc": "2.0", "method": "notifications/initialized" }
            ]))
            .await
            .unwrap();
        assert_eq!(resp.as_array().unwrap().len(), 1);
    }
}
