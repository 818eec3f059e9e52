//! In-process snippet store for development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{SnippetKey, SnippetStore, StorageError};

/// Snippet store backed by a map; contents vanish with the process.
#[derive(Default)]
pub struct MemorySnippetStore {
    blobs: Mutex<HashMap<SnippetKey, Vec<u8>>>,
}

impl MemorySnippetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed raw bytes under `key`, bypassing UTF-8 text writes.
    pub async fn insert_raw(&self, key: SnippetKey, bytes: Vec<u8>) {
        self.blobs.lock().await.insert(key, bytes);
    }
}

#[async_trait]
impl SnippetStore for MemorySnippetStore {
    async fn read(&self, key: &SnippetKey) -> Result<Vec<u8>, StorageError> {
        self.blobs
            .lock()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.clone()))
    }

    async fn write(&self, key: &SnippetKey, content: &str) -> Result<(), StorageError> {
        self.blobs
            .lock()
            .await
            .insert(key.clone(), content.as_bytes().to_vec());
        Ok(())
    }
}
