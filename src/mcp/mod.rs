//! Model Context Protocol (MCP) integration.
//!
//! Exposes the tool runtime as an MCP server so editors and agent hosts can call `hello_mcp`,
//! `get_snippet`, `save_snippet`, `abuseipdb_check_ip` and `abuseipdb_report_ip` over stdio.
//! Call arguments are wrapped as `{"arguments": ...}` before reaching the handlers, matching
//! the context shape the hosted trigger delivers.

mod schemas;
mod server;

pub use server::McpToolServer;
