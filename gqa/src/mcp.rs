//! MCP server on stdin/stdout
//!
//! Framing, the initialize handshake and method routing are handled by
//! `rmcp`. This module exposes the `ToolExecutor` catalog through
//! `ServerHandler::{list_tools, call_tool}` and checks call arguments
//! against the declared parameters before dispatch.

use std::sync::Arc;

use eyre::{Context, Result, eyre};
use rmcp::{
    ErrorData,
    handler::server::ServerHandler,
    model as m,
    service::{RequestContext, RoleServer, serve_server},
};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::tools::{ToolContext, ToolDefinition, ToolError, ToolExecutor, ToolResult, validate_args};

/// Name reported in the initialize handshake
pub const SERVER_NAME: &str = "gemini-qa-agent";

const INSTRUCTIONS: &str = "Code QA operations backed by the Gemini CLI: review_code, generate_tests, \
security_audit, performance_analysis, code_quality_report and ask_gemini.";

/// `ServerHandler` over the QA tool catalog
pub struct QaServer {
    executor: ToolExecutor,
    ctx: ToolContext,
}

impl QaServer {
    pub fn new(executor: ToolExecutor, ctx: ToolContext) -> Self {
        debug!("QaServer::new: called");
        Self { executor, ctx }
    }

    /// The catalog as MCP tool descriptors, in catalog order
    pub fn tools(&self) -> Vec<m::Tool> {
        self.executor.definitions().into_iter().map(to_mcp_tool).collect()
    }

    /// Check and run one call
    ///
    /// An unknown tool or arguments that do not match the declared
    /// parameters are rejected with `invalid_params` and never dispatched.
    /// Tool failures come back as a result with `isError` set.
    pub async fn call(&self, name: &str, arguments: Option<m::JsonObject>) -> Result<m::CallToolResult, ErrorData> {
        debug!(%name, "QaServer::call: called");
        let input = Value::Object(arguments.unwrap_or_default());

        let Some(params) = self.executor.params(name) else {
            warn!(%name, "QaServer::call: unknown tool");
            return Err(invalid_params(&ToolError::UnknownTool { name: name.to_string() }));
        };
        if let Err(e) = validate_args(params, &input) {
            warn!(%name, error = %e, "QaServer::call: rejected arguments");
            return Err(invalid_params(&e));
        }

        match self.executor.execute(name, &input, &self.ctx).await {
            Ok(result) => Ok(to_call_result(result)),
            Err(e @ ToolError::UnknownTool { .. }) => Err(invalid_params(&e)),
            Err(e) => Err(ErrorData::internal_error(e.to_string(), None)),
        }
    }
}

fn invalid_params(err: &ToolError) -> ErrorData {
    ErrorData::invalid_params(err.to_string(), None)
}

fn to_mcp_tool(def: ToolDefinition) -> m::Tool {
    let schema = match def.input_schema {
        Value::Object(map) => map,
        _ => m::JsonObject::new(),
    };
    m::Tool::new(def.name, def.description, Arc::new(schema))
}

fn to_call_result(result: ToolResult) -> m::CallToolResult {
    let content = vec![m::Content::text(result.content)];
    if result.is_error {
        m::CallToolResult::error(content)
    } else {
        m::CallToolResult::success(content)
    }
}

impl ServerHandler for QaServer {
    fn get_info(&self) -> m::ServerInfo {
        m::ServerInfo {
            capabilities: m::ServerCapabilities::builder().enable_tools().build(),
            server_info: m::Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<m::PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::ListToolsResult, ErrorData>> + Send + '_ {
        async move {
            Ok(m::ListToolsResult {
                tools: self.tools(),
                next_cursor: None,
            })
        }
    }

    fn call_tool(
        &self,
        request: m::CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::CallToolResult, ErrorData>> + Send + '_ {
        async move { self.call(&request.name, request.arguments).await }
    }
}

/// Serve MCP over an arbitrary byte stream pair until the client disconnects
pub async fn serve<R, W>(server: QaServer, reader: R, writer: W) -> Result<()>
where
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let running = serve_server(server, (reader, writer))
        .await
        .map_err(|e| eyre!("MCP initialization failed: {}", e))?;
    info!("MCP client initialized");

    let reason = running.waiting().await.context("MCP service task failed")?;
    info!(?reason, "MCP server stopped");
    Ok(())
}

/// Serve MCP on the process's stdin/stdout
pub async fn serve_stdio(server: QaServer) -> Result<()> {
    info!("MCP server starting on stdio");
    serve(server, tokio::io::stdin(), tokio::io::stdout()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::invoker::mock::MockInvoker;
    use crate::tools::context::test_support::mock_context;
    use serde_json::json;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    fn server(mock: Arc<MockInvoker>) -> QaServer {
        QaServer::new(ToolExecutor::standard(), mock_context(mock))
    }

    fn object(value: Value) -> Option<m::JsonObject> {
        match value {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    #[test]
    fn test_tools_follow_catalog() {
        let tools = serde_json::to_value(server(Arc::new(MockInvoker::succeeding(""))).tools()).unwrap();

        let names: Vec<&str> = tools
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            [
                "review_code",
                "generate_tests",
                "security_audit",
                "performance_analysis",
                "code_quality_report",
                "ask_gemini"
            ]
        );
        assert_eq!(tools[0]["inputSchema"]["type"], "object");
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["file_path"]));
        assert_eq!(tools[5]["inputSchema"]["properties"]["include_all_files"]["default"], false);
    }

    #[test]
    fn test_server_info() {
        let info = serde_json::to_value(server(Arc::new(MockInvoker::succeeding(""))).get_info()).unwrap();
        assert_eq!(info["serverInfo"]["name"], SERVER_NAME);
        assert!(info["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_call_success() {
        let mock = Arc::new(MockInvoker::succeeding("pong"));
        let result = server(mock.clone())
            .call("ask_gemini", object(json!({"prompt": "ping"})))
            .await
            .unwrap();

        let result = serde_json::to_value(result).unwrap();
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], "✅ Gemini Response:\n\npong");
        assert_ne!(result["isError"], true);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_call_failure_sets_is_error() {
        let mock = Arc::new(MockInvoker::succeeding("unused"));
        let result = server(mock.clone())
            .call("review_code", object(json!({"file_path": "/no/such/a.py"})))
            .await
            .unwrap();

        let result = serde_json::to_value(result).unwrap();
        assert_eq!(result["isError"], true);
        assert!(
            result["content"][0]["text"]
                .as_str()
                .unwrap()
                .starts_with("❌ Code review failed: File not found")
        );
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let mock = Arc::new(MockInvoker::succeeding("unused"));
        let err = server(mock.clone()).call("format_disk", None).await.unwrap_err();

        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        assert_eq!(err.message, "Unknown tool: format_disk");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_bad_arguments_rejected_before_dispatch() {
        let mock = Arc::new(MockInvoker::succeeding("unused"));
        let qa = server(mock.clone());

        let missing = qa.call("ask_gemini", None).await.unwrap_err();
        assert_eq!(missing.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        assert!(missing.message.contains("prompt is required"));

        let wrong = qa
            .call("ask_gemini", object(json!({"prompt": "hi", "include_all_files": "yes"})))
            .await
            .unwrap_err();
        assert!(wrong.message.contains("include_all_files must be a boolean"));

        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_session_over_byte_stream() {
        let (client, server_io) = tokio::io::duplex(64 * 1024);
        let (server_read, server_write) = tokio::io::split(server_io);
        let qa = server(Arc::new(MockInvoker::succeeding("pong")));
        let handle = tokio::spawn(serve(qa, server_read, server_write));

        let (client_read, mut client_write) = tokio::io::split(client);
        let mut lines = BufReader::new(client_read).lines();
        let messages = [
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"0.0.0"}}}"#,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"ask_gemini","arguments":{"prompt":"ping"}}}"#,
        ];

        client_write.write_all(format!("{}\n", messages[0]).as_bytes()).await.unwrap();
        let init: Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(init["id"], 1);
        assert_eq!(init["result"]["serverInfo"]["name"], SERVER_NAME);

        for message in &messages[1..] {
            client_write.write_all(format!("{}\n", message).as_bytes()).await.unwrap();
        }
        let reply: Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(reply["id"], 2);
        assert_eq!(reply["result"]["content"][0]["text"], "✅ Gemini Response:\n\npong");

        client_write.shutdown().await.unwrap();
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }
}
