// ABOUTME: Blob store capability used by the synchronizer
// ABOUTME: Folder listing plus whole-object reads and writes of small text objects

mod gcs;

pub use gcs::{folder_name, CloudStorageClient, DEFAULT_STORAGE_API_URL};

use anyhow::Result;
use async_trait::async_trait;

/// The destination side of the mirror.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Names of the immediate subfolders under `prefix`.
    async fn list_subfolders(&self, prefix: &str) -> Result<Vec<String>>;

    /// Create or overwrite the object at `path`.
    async fn write_object(&self, path: &str, content: &str) -> Result<()>;

    /// Read the object at `path` as UTF-8.
    ///
    /// A missing object is reported as [`crate::MirrorError::NotFound`].
    async fn read_object(&self, path: &str) -> Result<String>;
}
