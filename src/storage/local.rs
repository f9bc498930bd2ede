//! Local filesystem store
//!
//! The bucket names a root directory, created on startup when missing.
//! Useful for development and for serving a mounted volume.

use object_store::local::LocalFileSystem;
use object_store::ObjectStore;
use std::sync::Arc;
use tracing::info;

use crate::config::BackendConfig;
use crate::errors::Result;

/// Build a filesystem store rooted at the configured directory
pub fn build(config: &BackendConfig) -> Result<Arc<dyn ObjectStore>> {
    std::fs::create_dir_all(&config.bucket)?;
    let store = LocalFileSystem::new_with_prefix(&config.bucket)?;
    info!(root = %config.bucket, "Using local filesystem store");
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendType, Config};
    use crate::storage::{ObjectStoreBackend, StorageBackend};
    use bytes::Bytes;

    #[tokio::test]
    async fn test_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default().backend;
        config.backend_type = BackendType::Local;
        config.bucket = dir.path().join("root").to_string_lossy().into_owned();

        let backend = ObjectStoreBackend::new(build(&config).unwrap(), None);
        backend
            .put("/images/cat.png", Bytes::from_static(b"meow"))
            .await
            .unwrap();
        assert!(dir.path().join("root/images/cat.png").exists());

        let entries = backend.list("/images").drain().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "cat.png");
        assert_eq!(entries[0].size, 4);

        backend.delete("/images/cat.png").await.unwrap();
        assert!(matches!(
            backend.delete("/images/cat.png").await,
            Err(crate::errors::GatewayError::NotFound { .. })
        ));
    }
}
