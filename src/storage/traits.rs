//! Blob store trait definitions

use crate::types::{BlobInfo, BlobObject, StoredBlob};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during blob store operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid pathname: {0}")]
    InvalidPathname(String),

    #[error("URL does not belong to this store: {0}")]
    ForeignUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Storage error: {0}")]
    Other(String),
}

/// Abstract key→bytes object store with publicly readable URLs.
///
/// Objects are addressed by pathname for writes and reads, and by the public
/// URL the store minted for them when deleting, mirroring the admin panel's
/// delete-by-URL contract.
///
/// This trait is object-safe and used as `Arc<dyn BlobStore>`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under a pathname, overwriting any existing object.
    async fn put(
        &self,
        pathname: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<StoredBlob, StorageError>;

    /// Fetch an object and its stored content type.
    async fn get(&self, pathname: &str) -> Result<BlobObject, StorageError>;

    /// List every stored object.
    async fn list(&self) -> Result<Vec<BlobInfo>, StorageError>;

    /// Delete an object by its public URL.
    async fn delete(&self, url: &str) -> Result<(), StorageError>;
}
