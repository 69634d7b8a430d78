//! MCP server implementation using the official rmcp SDK

use crate::error::ServerError;
use futures::future::BoxFuture;
use rmcp::{
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
        Tool,
    },
    service::{NotificationContext, RequestContext, RoleServer},
    transport::stdio,
    ErrorData as McpError, ServiceExt,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Future returned by a tool handler
pub type ToolFuture = BoxFuture<'static, Result<CallToolResult, ServerError>>;

/// Tool execution handler function type
pub type ToolHandler = Arc<dyn Fn(JsonObject) -> ToolFuture + Send + Sync>;

/// Server information structure
#[derive(Clone)]
pub struct ServerInfoData {
    pub name: String,
    pub version: String,
    pub title: Option<String>,
    pub instructions: Option<String>,
}

/// MCP server exposing registered tools over rmcp
#[derive(Clone)]
pub struct McpServer {
    server_info: ServerInfoData,
    tools: Arc<RwLock<Vec<Tool>>>,
    tool_handlers: Arc<RwLock<HashMap<String, ToolHandler>>>,
}

impl McpServer {
    /// Create a new MCP server with basic information
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            server_info: ServerInfoData {
                name: name.into(),
                version: version.into(),
                title: None,
                instructions: None,
            },
            tools: Arc::new(RwLock::new(Vec::new())),
            tool_handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Set optional title for the server
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.server_info.title = Some(title.into());
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.server_info.instructions = Some(instructions.into());
        self
    }

    /// Add a tool to the server, replacing any tool with the same name
    pub async fn add_tool(&self, tool: Tool, handler: ToolHandler) {
        let mut tools = self.tools.write().await;
        let mut handlers = self.tool_handlers.write().await;

        tools.retain(|existing| existing.name != tool.name);
        handlers.insert(tool.name.to_string(), handler);
        tools.push(tool);
    }

    /// Tools in registration order
    pub async fn tool_definitions(&self) -> Vec<Tool> {
        self.tools.read().await.clone()
    }

    /// Run a tool by name. Failures become error results, never protocol errors.
    pub async fn execute_tool(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        let handler = self.tool_handlers.read().await.get(name).cloned();

        let Some(handler) = handler else {
            warn!("Tool '{}' not found", name);
            return Self::error_result(format!("Tool '{}' not found", name));
        };

        info!("Executing tool: {}", name);
        match handler(arguments.unwrap_or_default()).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Tool '{}' failed: {}", name, e);
                Self::error_result(e.user_message())
            }
        }
    }

    /// Create a success result holding pretty-printed JSON
    pub fn json_result(value: &Value) -> Result<CallToolResult, ServerError> {
        let text = serde_json::to_string_pretty(value)?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Create an error result for tool execution
    pub fn error_result(message: impl Into<String>) -> CallToolResult {
        CallToolResult::error(vec![Content::text(message.into())])
    }

    /// Run the server with STDIO transport until the client disconnects
    pub async fn run(self) -> Result<(), ServerError> {
        info!("Starting MCP server on stdio");

        let service = self
            .serve(stdio())
            .await
            .map_err(|e| ServerError::Transport(format!("Failed to create server: {}", e)))?;

        let reason = service
            .waiting()
            .await
            .map_err(|e| ServerError::Transport(e.to_string()))?;

        info!("MCP server stopped: {:?}", reason);
        Ok(())
    }
}

impl ServerHandler for McpServer {
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            debug!("Tool execution started");
            Ok(self.execute_tool(request.name.as_ref(), request.arguments).await)
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        async move {
            debug!("Listing available tools");

            let tools = self.tool_definitions().await;

            info!("Returned {} tools", tools.len());
            Ok(ListToolsResult::with_all_items(tools))
        }
    }

    fn on_initialized(
        &self,
        _context: NotificationContext<RoleServer>,
    ) -> impl std::future::Future<Output = ()> + Send + '_ {
        async move {
            info!("Client has completed initialization");
        }
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.server_info.name.clone(),
                version: self.server_info.version.clone(),
                title: self.server_info.title.clone(),
                ..Default::default()
            },
            instructions: self.server_info.instructions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    fn echo_tool() -> Tool {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "Text to echo"
                }
            },
            "required": ["text"]
        });
        let Value::Object(schema) = schema else {
            unreachable!()
        };
        Tool::new("echo", "Echo tool", Arc::new(schema))
    }

    fn echo_handler() -> ToolHandler {
        Arc::new(|arguments: JsonObject| {
            async move {
                let text = arguments
                    .get("text")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| ServerError::InvalidArguments("text is required".into()))?;
                Ok::<_, ServerError>(CallToolResult::success(vec![Content::text(
                    text.to_string(),
                )]))
            }
            .boxed()
        })
    }

    fn first_text(result: &CallToolResult) -> String {
        result.content[0]
            .as_text()
            .map(|t| t.text.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_server_creation() {
        let server = McpServer::new("test-server", "1.0.0").with_title("Test MCP Server");

        assert_eq!(server.server_info.name, "test-server");
        assert_eq!(server.server_info.version, "1.0.0");
        assert_eq!(server.server_info.title, Some("Test MCP Server".to_string()));

        let info = server.get_info();
        assert_eq!(info.server_info.name, "test-server");
        assert!(info.capabilities.tools.is_some());
    }

    #[tokio::test]
    async fn test_tool_addition() {
        let server = McpServer::new("test-server", "1.0.0");

        server.add_tool(echo_tool(), echo_handler()).await;
        server.add_tool(echo_tool(), echo_handler()).await;

        let tools = server.tool_definitions().await;
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "echo");
    }

    #[tokio::test]
    async fn test_execute_tool() {
        let server = McpServer::new("test-server", "1.0.0");
        server.add_tool(echo_tool(), echo_handler()).await;

        let mut arguments = JsonObject::new();
        arguments.insert("text".into(), Value::String("hello".into()));
        let result = server.execute_tool("echo", Some(arguments)).await;

        assert_eq!(result.is_error, Some(false));
        assert_eq!(first_text(&result), "hello");
    }

    #[tokio::test]
    async fn test_handler_error_becomes_error_result() {
        let server = McpServer::new("test-server", "1.0.0");
        server.add_tool(echo_tool(), echo_handler()).await;

        let result = server.execute_tool("echo", None).await;

        assert_eq!(result.is_error, Some(true));
        assert!(first_text(&result).contains("text is required"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let server = McpServer::new("test-server", "1.0.0");

        let result = server.execute_tool("missing", None).await;

        assert_eq!(result.is_error, Some(true));
        assert_eq!(first_text(&result), "Tool 'missing' not found");
    }
}
