//! Storage capability interface
//!
//! The only two operations the apply stage needs from object storage and
//! the CDN. Authentication and bucket setup belong to the implementation.

use crate::error::StorageError;

/// Storage and CDN collaborator
///
/// Implement this trait to target a storage backend. Both calls must be
/// idempotent: re-applying a redirect that is already in place succeeds.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StorageClient: Send + Sync {
    /// Write a metadata-only redirect at `source_path` pointing to `target_path`
    async fn put_redirect(&self, source_path: &str, target_path: &str)
        -> Result<(), StorageError>;

    /// Ask the CDN to drop cached copies of `path`
    async fn invalidate(&self, path: &str) -> Result<(), StorageError>;
}
