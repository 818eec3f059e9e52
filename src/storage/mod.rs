//! Snippet blob storage.
//!
//! Snippets are addressed by `snippets/<snippetname>.json`. The bindings in this module resolve
//! that key from tool arguments and move UTF-8 text in and out of a [`SnippetStore`].

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{Config, SnippetStoreKind};

pub mod fs;
pub mod memory;

pub use fs::FsSnippetStore;
pub use memory::MemorySnippetStore;

/// Container prefix shared by every snippet key.
pub const SNIPPET_PREFIX: &str = "snippets";
/// Extension appended to snippet names.
pub const SNIPPET_EXTENSION: &str = "json";

/// Errors raised by snippet bindings and stores.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Snippet name cannot form a safe key.
    #[error("Invalid snippet name: {0:?}")]
    InvalidKey(String),
    /// Binding could not find the argument that names the blob.
    #[error("Cannot resolve blob path: {0}")]
    Unresolved(String),
    /// Nothing stored under the key.
    #[error("Snippet not found: {0}")]
    NotFound(SnippetKey),
    /// Underlying filesystem failure.
    #[error("Storage I/O failed for {key}: {source}")]
    Io {
        /// Key being read or written.
        key: SnippetKey,
        /// Error reported by the filesystem.
        #[source]
        source: std::io::Error,
    },
}

/// Blob key for a named snippet: `snippets/<name>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnippetKey {
    name: String,
}

impl SnippetKey {
    /// Build the key for `name`, rejecting names that would escape the snippet container.
    pub fn for_name(name: &str) -> Result<Self, StorageError> {
        let invalid = name.trim().is_empty()
            || name.contains(['/', '\\', '\0'])
            || name == "."
            || name == "..";
        if invalid {
            return Err(StorageError::InvalidKey(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// Snippet name the key was built from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Relative blob path.
    pub fn path(&self) -> PathBuf {
        PathBuf::from(SNIPPET_PREFIX).join(format!("{}.{SNIPPET_EXTENSION}", self.name))
    }
}

impl fmt::Display for SnippetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SNIPPET_PREFIX}/{}.{SNIPPET_EXTENSION}", self.name)
    }
}

/// Key-value blob interface used by the snippet tools.
#[async_trait]
pub trait SnippetStore: Send + Sync {
    /// Read the raw bytes stored under `key`.
    async fn read(&self, key: &SnippetKey) -> Result<Vec<u8>, StorageError>;

    /// Store `content` under `key`, replacing any previous value.
    async fn write(&self, key: &SnippetKey, content: &str) -> Result<(), StorageError>;
}

/// Output slot a handler fills; the binding persists it after the handler returns.
#[derive(Debug, Default)]
pub struct BlobOutput {
    value: Option<String>,
}

impl BlobOutput {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the content to persist.
    pub fn set(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }

    /// Content set by the handler, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Take the content, leaving the slot empty.
    pub fn take(&mut self) -> Option<String> {
        self.value.take()
    }
}

/// Build the store selected by configuration.
pub fn store_from_config(config: &Config) -> Arc<dyn SnippetStore> {
    match config.snippet_store {
        SnippetStoreKind::Fs => Arc::new(FsSnippetStore::new(config.snippet_root.clone())),
        SnippetStoreKind::Memory => Arc::new(MemorySnippetStore::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_follows_blob_path_template() {
        let key = SnippetKey::for_name("greeting").expect("key");
        assert_eq!(key.to_string(), "snippets/greeting.json");
        assert_eq!(key.path(), PathBuf::from("snippets").join("greeting.json"));
        assert_eq!(key.name(), "greeting");
    }

    #[test]
    fn key_rejects_names_escaping_the_container() {
        for name in ["", "  ", "../etc/passwd", "a/b", "a\\b", ".", ".."] {
            assert!(
                matches!(SnippetKey::for_name(name), Err(StorageError::InvalidKey(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn key_allows_dots_inside_names() {
        let key = SnippetKey::for_name("v1..2-notes").expect("key");
        assert_eq!(key.to_string(), "snippets/v1..2-notes.json");
    }

    #[test]
    fn blob_output_starts_empty() {
        let mut out = BlobOutput::new();
        assert_eq!(out.value(), None);
        out.set("content");
        assert_eq!(out.value(), Some("content"));
        assert_eq!(out.take().as_deref(), Some("content"));
        assert_eq!(out.value(), None);
    }
}
