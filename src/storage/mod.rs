//! Storage abstractions for artifact relocation.
//!
//! Fetched media is relocated onto durable object storage and addressed by
//! a stable public URL. The backend seam is a single object-put operation;
//! production uses S3, tests and dry runs use the local filesystem.

pub mod local;
pub mod relocate;
pub mod s3;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use local::LocalBackend;
pub use relocate::ArtifactRelocator;
pub use s3::S3Backend;

/// Object storage as consumed by the relocator.
///
/// Puts are idempotent: writing the same key twice overwrites, so retries
/// after partial failure are always safe.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store the file at `local_path` under `key` with the given content
    /// type.
    async fn put_object(&self, key: &str, local_path: &Path, content_type: &str) -> Result<()>;
}

/// Content type for a file, derived from its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "webm" => "video/webm",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
