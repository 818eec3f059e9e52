//! Greeting tool.

use super::arguments::TriggerPayload;

/// Fixed greeting returned by `hello_mcp`.
pub const GREETING: &str = "Hello I am MCPTool!";

/// Return the greeting; the payload is ignored.
pub fn hello_mcp(_payload: &TriggerPayload) -> String {
    GREETING.to_string()
}
