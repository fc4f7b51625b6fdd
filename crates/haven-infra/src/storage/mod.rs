//! Local-filesystem blob store for transcript archives.
//!
//! Keys are slash-separated paths under a configured root, mirroring the
//! object-store layout (`summarylogs/json/...`, `summarylogs/text/...`)
//! so a later move to a bucket-backed store keeps the same keys.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use haven_core::blob::BlobStore;
use haven_types::error::BlobError;

pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key to a path under the root, rejecting traversal.
    fn resolve(&self, key: &str) -> Result<PathBuf, BlobError> {
        let relative = Path::new(key);
        let traverses = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || traverses {
            return Err(BlobError::Io(format!("invalid blob key: '{key}'")));
        }
        Ok(self.root.join(relative))
    }
}

impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String, BlobError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BlobError::Io(e.to_string()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| BlobError::Io(e.to_string()))?;

        debug!(key, bytes = bytes.len(), "blob written");
        Ok(key.to_string())
    }
}
