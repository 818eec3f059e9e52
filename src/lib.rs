#![deny(missing_docs)]

//! Core library for MCPTool: a small set of tools (greeting, snippet storage and AbuseIPDB
//! lookups) served over MCP stdio and an HTTP webhook surface.

/// AbuseIPDB v2 client.
pub mod abuseipdb;
/// HTTP routing and webhook handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Packaging and secret provisioning helpers for Azure deployments.
pub mod deploy;
/// Structured logging and tracing setup.
pub mod logging;
/// Model Context Protocol server implementation.
pub mod mcp;
/// Tool dispatch shared by every serving surface.
pub mod runtime;
/// Snippet blob storage backends.
pub mod storage;
/// Tool handlers, argument contract and registry.
pub mod tools;
