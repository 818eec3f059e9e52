//! MCP server entrypoint (stdio transport).
//!
//! Serves the MCPTool tools over stdio for editor and agent hosts. Shares configuration with
//! the HTTP binary; logs go to stderr and the log file so stdout carries only protocol frames.
use anyhow::{Context, Result};
use mcptool::{config, logging, mcp::McpToolServer, runtime::ToolRuntime};
use rmcp::{service::ServiceExt, transport::stdio};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    config::init_config();
    logging::init_tracing();

    let runtime =
        ToolRuntime::from_config(config::get_config()).context("failed to build tool runtime")?;
    let server = McpToolServer::new(Arc::new(runtime));

    let service = server
        .serve(stdio())
        .await
        .context("failed to start MCP server over stdio")?;

    service
        .waiting()
        .await
        .context("MCP server terminated unexpectedly")?;

    Ok(())
}
