//! Blob store trait for transcript archival.

use haven_types::error::BlobError;

/// Write-once blob storage. `put` returns the stored object's key.
pub trait BlobStore: Send + Sync {
    fn put(
        &self,
        key: &str,
        bytes: &[u8],
    ) -> impl std::future::Future<Output = Result<String, BlobError>> + Send;
}
