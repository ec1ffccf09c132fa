//! Artifact relocation: local file to durable public address.

use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use crate::error::Result;
use crate::models::StorageConfig;
use crate::storage::{content_type_for, StorageBackend};

/// Uploads fetched artifacts and hands back their public addresses.
///
/// One instance per run, owning its injected backend. Relocation is
/// idempotent: the backend overwrites on key collision, so re-running a
/// unit after a crash re-uploads safely.
pub struct ArtifactRelocator {
    backend: Arc<dyn StorageBackend>,
    key_root: String,
    public_prefix: String,
}

impl ArtifactRelocator {
    pub fn new(backend: Arc<dyn StorageBackend>, config: &StorageConfig) -> Self {
        Self {
            backend,
            key_root: config.key_root.trim_matches('/').to_string(),
            public_prefix: config.public_prefix.clone(),
        }
    }

    /// Upload `local_path` and return its public address, or `None` when
    /// the local file does not exist (a failed fetch upstream).
    pub async fn relocate(
        &self,
        local_path: &Path,
        category: &str,
        filename: &str,
    ) -> Result<Option<String>> {
        if !local_path.exists() {
            warn!("local file missing, nothing to relocate: {}", local_path.display());
            return Ok(None);
        }

        let key = if category.is_empty() {
            format!("{}/{}", self.key_root, filename)
        } else {
            format!("{}/{}/{}", self.key_root, category, filename)
        };

        let content_type = content_type_for(local_path);
        self.backend
            .put_object(&key, local_path, content_type)
            .await?;

        Ok(Some(format!("{}{}", self.public_prefix, key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalBackend;
    use tempfile::TempDir;

    fn relocator(store: &TempDir) -> ArtifactRelocator {
        let config = StorageConfig {
            key_root: "video-materials".to_string(),
            public_prefix: "https://cdn.test/".to_string(),
            ..StorageConfig::default()
        };
        ArtifactRelocator::new(Arc::new(LocalBackend::new(store.path())), &config)
    }

    #[tokio::test]
    async fn returns_public_address_not_backend_path() {
        let store = TempDir::new().unwrap();
        let src = TempDir::new().unwrap();
        let local = src.path().join("abc_video.mp4");
        tokio::fs::write(&local, b"media").await.unwrap();

        let location = relocator(&store)
            .relocate(&local, "", "abc_video.mp4")
            .await
            .unwrap();
        assert_eq!(
            location.as_deref(),
            Some("https://cdn.test/video-materials/abc_video.mp4")
        );
    }

    #[tokio::test]
    async fn category_lands_in_key_path() {
        let store = TempDir::new().unwrap();
        let src = TempDir::new().unwrap();
        let local = src.path().join("abc_cover.jpg");
        tokio::fs::write(&local, b"img").await.unwrap();

        let location = relocator(&store)
            .relocate(&local, "winter_vibe", "abc_cover.jpg")
            .await
            .unwrap();
        assert_eq!(
            location.as_deref(),
            Some("https://cdn.test/video-materials/winter_vibe/abc_cover.jpg")
        );
        assert!(store
            .path()
            .join("video-materials/winter_vibe/abc_cover.jpg")
            .exists());
    }

    #[tokio::test]
    async fn missing_local_file_is_a_noop() {
        let store = TempDir::new().unwrap();
        let location = relocator(&store)
            .relocate(Path::new("/nonexistent/file.mp4"), "", "file.mp4")
            .await
            .unwrap();
        assert_eq!(location, None);
    }

    #[tokio::test]
    async fn relocation_is_idempotent() {
        let store = TempDir::new().unwrap();
        let src = TempDir::new().unwrap();
        let local = src.path().join("abc_video.mp4");
        tokio::fs::write(&local, b"media").await.unwrap();

        let relocator = relocator(&store);
        let first = relocator.relocate(&local, "cat", "abc_video.mp4").await.unwrap();
        let second = relocator.relocate(&local, "cat", "abc_video.mp4").await.unwrap();
        assert_eq!(first, second);
        assert!(first.is_some());
    }
}
