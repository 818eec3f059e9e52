//! Filesystem-backed snippet store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{SnippetKey, SnippetStore, StorageError};

/// Stores each snippet as a file under a root directory.
pub struct FsSnippetStore {
    root: PathBuf,
}

impl FsSnippetStore {
    /// Create a store rooted at `root`. Directories are created lazily on write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the store writes under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, key: &SnippetKey) -> PathBuf {
        self.root.join(key.path())
    }
}

#[async_trait]
impl SnippetStore for FsSnippetStore {
    async fn read(&self, key: &SnippetKey) -> Result<Vec<u8>, StorageError> {
        let path = self.locate(key);
        match fs::read(&path).await {
            Ok(bytes) => {
                tracing::debug!(key = %key, bytes = bytes.len(), "Read snippet blob");
                Ok(bytes)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.clone()))
            }
            Err(source) => Err(StorageError::Io {
                key: key.clone(),
                source,
            }),
        }
    }

    async fn write(&self, key: &SnippetKey, content: &str) -> Result<(), StorageError> {
        let path = self.locate(key);
        let io_error = |source| StorageError::Io {
            key: key.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        fs::write(&path, content.as_bytes())
            .await
            .map_err(io_error)?;
        tracing::debug!(key = %key, bytes = content.len(), "Wrote snippet blob");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_under_snippet_container() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsSnippetStore::new(dir.path());
        let key = SnippetKey::for_name("deploy-notes").expect("key");

        store.write(&key, "content").await.expect("write");

        let on_disk = std::fs::read_to_string(dir.path().join("snippets/deploy-notes.json"))
            .expect("file present");
        assert_eq!(on_disk, "content");
        assert_eq!(store.read(&key).await.expect("read"), b"content");
    }

    #[tokio::test]
    async fn missing_blob_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsSnippetStore::new(dir.path());
        let key = SnippetKey::for_name("absent").expect("key");

        let err = store.read(&key).await.expect_err("should be missing");
        assert!(matches!(err, StorageError::NotFound(found) if found == key));
    }
}
