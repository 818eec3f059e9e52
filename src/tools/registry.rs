//! Explicit name → handler registration for the tool set.

use std::{collections::BTreeMap, future::Future, pin::Pin};

use super::{
    ToolError,
    abuseipdb::{abuseipdb_check_ip, abuseipdb_report_ip},
    arguments::TriggerPayload,
    hello::hello_mcp,
    snippets::{invoke_get_snippet, invoke_save_snippet},
    spec::{ABUSEIPDB_CHECK_IP, ABUSEIPDB_REPORT_IP, GET_SNIPPET, HELLO_MCP, SAVE_SNIPPET},
};
use crate::runtime::ToolRuntime;

/// Boxed future produced by a registered tool.
pub type ToolFuture = Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send>>;

/// Entry point registered for a tool name.
pub type ToolHandler = fn(&ToolRuntime, TriggerPayload) -> ToolFuture;

/// Registry mapping tool names to handler functions.
#[derive(Clone)]
pub struct Registry {
    tools: BTreeMap<&'static str, ToolHandler>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Registry holding every tool this server ships.
    pub fn with_default_tools() -> Self {
        let mut registry = Self::new();
        registry.register(HELLO_MCP.name, tool_hello_mcp);
        registry.register(GET_SNIPPET.name, tool_get_snippet);
        registry.register(SAVE_SNIPPET.name, tool_save_snippet);
        registry.register(ABUSEIPDB_CHECK_IP.name, tool_abuseipdb_check_ip);
        registry.register(ABUSEIPDB_REPORT_IP.name, tool_abuseipdb_report_ip);
        registry
    }

    /// Register `handler` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: &'static str, handler: ToolHandler) {
        self.tools.insert(name, handler);
    }

    /// Handler registered for `name`.
    pub fn get(&self, name: &str) -> Option<ToolHandler> {
        self.tools.get(name).copied()
    }

    /// Registered tool names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tools.keys().copied()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_default_tools()
    }
}

fn tool_hello_mcp(_runtime: &ToolRuntime, payload: TriggerPayload) -> ToolFuture {
    Box::pin(async move { Ok(hello_mcp(&payload)) })
}

fn tool_get_snippet(runtime: &ToolRuntime, payload: TriggerPayload) -> ToolFuture {
    let store = runtime.store();
    Box::pin(async move { invoke_get_snippet(store.as_ref(), &payload).await })
}

fn tool_save_snippet(runtime: &ToolRuntime, payload: TriggerPayload) -> ToolFuture {
    let store = runtime.store();
    Box::pin(async move { invoke_save_snippet(store.as_ref(), &payload).await })
}

fn tool_abuseipdb_check_ip(runtime: &ToolRuntime, payload: TriggerPayload) -> ToolFuture {
    let api = runtime.reputation();
    Box::pin(async move { Ok(abuseipdb_check_ip(api.as_ref(), &payload).await) })
}

fn tool_abuseipdb_report_ip(runtime: &ToolRuntime, payload: TriggerPayload) -> ToolFuture {
    let api = runtime.reputation();
    Box::pin(async move { Ok(abuseipdb_report_ip(api.as_ref(), &payload).await) })
}
