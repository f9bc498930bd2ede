//! Storage backend abstraction layer
//!
//! Provides a unified interface for the gateway's four storage operations
//! (list, delete, put, mkdir) over the object_store crate. Provider specific
//! code is limited to building the `ObjectStore` client from static
//! credentials; everything else lives in `ObjectStoreBackend`.

mod aws;
mod azure;
mod backend;
mod gcp;
mod listing;
mod local;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use object_store::memory::InMemory;
use object_store::ObjectStore;
use serde::Serialize;
use std::sync::Arc;

use crate::config::{BackendConfig, BackendType};
use crate::errors::Result;

pub use backend::ObjectStoreBackend;
pub use listing::Listing;

/// Content type reported for directory entries
pub const DIRECTORY_CONTENT_TYPE: &str = "application/x-directory";

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectInfo {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub content_type: String,
    #[serde(rename = "ETag")]
    pub e_tag: Option<String>,
    pub time: DateTime<Utc>,
}

impl ObjectInfo {
    pub fn file(name: impl Into<String>, size: u64, e_tag: Option<String>, time: DateTime<Utc>) -> Self {
        let name = name.into();
        let content_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            name,
            is_dir: false,
            size,
            content_type,
            e_tag,
            time,
        }
    }

    pub fn directory(name: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
            size: 0,
            content_type: DIRECTORY_CONTENT_TYPE.to_string(),
            e_tag: None,
            time,
        }
    }
}

/// Storage backend trait for the gateway's operations
///
/// Paths are slash separated and relative to the bucket root; leading,
/// trailing and repeated slashes are ignored.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Stream the entries directly under `path`
    fn list(&self, path: &str) -> Listing;

    /// Delete a file, or a directory holding nothing but its marker
    async fn delete(&self, path: &str) -> Result<()>;

    /// Write an object at the given path
    async fn put(&self, path: &str, data: Bytes) -> Result<()>;

    /// Create a directory at the given path
    async fn mkdir(&self, path: &str) -> Result<()>;
}

/// Create a storage backend based on configuration
///
/// The bucket, operator and secret are forwarded to the provider as static
/// credentials; see `BackendConfig`.
pub fn create_backend(config: &BackendConfig) -> Result<Arc<dyn StorageBackend>> {
    let store: Arc<dyn ObjectStore> = match config.backend_type {
        BackendType::Aws => aws::build(config)?,
        BackendType::Azure => azure::build(config)?,
        BackendType::Gcp => gcp::build(config)?,
        BackendType::Local => local::build(config)?,
        BackendType::Memory => Arc::new(InMemory::new()),
    };
    let backend = ObjectStoreBackend::new(store, config.prefix.as_deref());
    Ok(Arc::new(backend))
}
