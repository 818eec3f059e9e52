//! Tool handlers and the shared argument contract.
//!
//! Every tool follows the same protocol: decode the trigger payload, check required fields in
//! declared order, perform one side effect, and answer with a string. Validation problems are
//! answers; only binding and decoding failures surface as [`ToolError`].

use thiserror::Error;

use crate::storage::StorageError;

pub mod abuseipdb;
pub mod arguments;
pub mod hello;
pub mod registry;
pub mod snippets;
pub mod spec;

pub use arguments::{ArgumentError, ToolArguments, TriggerPayload};
pub use registry::Registry;
pub use spec::{TOOLS, ToolProperty, ToolSpec};

/// Failures that abort a tool invocation instead of producing a result string.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Stored snippet bytes are not valid UTF-8.
    #[error("Failed to decode snippet as UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),
    /// Storage binding failed to resolve, read or write the blob.
    #[error("Snippet storage failed: {0}")]
    Storage(#[from] StorageError),
    /// No tool registered under the requested name.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}
