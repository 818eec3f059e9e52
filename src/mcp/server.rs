//! MCP server bootstrap and request dispatch.

use std::{borrow::Cow, sync::Arc};

use crate::{
    mcp::schemas,
    runtime::ToolRuntime,
    tools::{TOOLS, ToolError, ToolSpec, TriggerPayload},
};
use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, ListToolsResult, ServerCapabilities,
        ServerInfo, Tool, ToolAnnotations,
    },
};

/// MCP server exposing the tool runtime over any rmcp transport.
#[derive(Clone)]
pub struct McpToolServer {
    runtime: Arc<ToolRuntime>,
}

impl McpToolServer {
    /// Create a server dispatching to `runtime`.
    pub fn new(runtime: Arc<ToolRuntime>) -> Self {
        Self { runtime }
    }

    fn describe_tools(&self) -> Vec<Tool> {
        let registry = self.runtime.registry();
        TOOLS
            .iter()
            .filter(|spec| registry.get(spec.name).is_some())
            .map(describe_tool)
            .collect()
    }
}

fn describe_tool(spec: &ToolSpec) -> Tool {
    Tool {
        name: Cow::Borrowed(spec.name),
        title: Some(spec.title.to_string()),
        description: Some(Cow::Borrowed(spec.description)),
        input_schema: Arc::new(schemas::tool_input_schema(spec)),
        output_schema: None,
        annotations: Some(
            ToolAnnotations::with_title(spec.title)
                .read_only(spec.read_only)
                .destructive(false)
                .idempotent(spec.read_only)
                .open_world(spec.open_world),
        ),
        icons: None,
    }
}

fn into_mcp_error(err: ToolError) -> McpError {
    match err {
        ToolError::UnknownTool(name) => {
            McpError::invalid_params(format!("Unknown tool: {name}"), None)
        }
        other => McpError::internal_error(other.to_string(), None),
    }
}

impl ServerHandler for McpToolServer {
    fn get_info(&self) -> ServerInfo {
        let mut implementation = rmcp::model::Implementation::from_build_env();
        implementation.name = "mcptool".to_string();
        implementation.title = Some("MCPTool".to_string());
        implementation.version = env!("CARGO_PKG_VERSION").to_string();

        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: implementation,
            instructions: Some(
                "Save and retrieve named text snippets, and check or report IP addresses with AbuseIPDB. Every tool answers with a plain string.".into(),
            ),
            ..ServerInfo::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools = self.describe_tools();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    #[allow(clippy::manual_async_fn)]
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            let payload = TriggerPayload::from_tool_call(request.arguments);
            let text = self
                .runtime
                .invoke(request.name.as_ref(), payload)
                .await
                .map_err(into_mcp_error)?;
            Ok(CallToolResult::success(vec![Content::text(text)]))
        }
    }
}
