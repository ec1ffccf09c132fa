//! Local filesystem storage backend.
//!
//! Mirrors the object-put contract onto a directory tree. Used by tests
//! and dry runs; production deployments use `S3Backend`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::storage::StorageBackend;

/// Filesystem-backed object storage rooted at a directory.
#[derive(Clone)]
pub struct LocalBackend {
    root_dir: PathBuf,
}

impl LocalBackend {
    /// Create a new LocalBackend rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a storage key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    async fn put_object(&self, key: &str, local_path: &Path, _content_type: &str) -> Result<()> {
        let dest = self.path(key);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(local_path, &dest).await?;
        debug!("stored {} at {}", key, dest.display());
        Ok(())
    }
}
