//! `StorageBackend` over any `object_store::ObjectStore`
//!
//! Object stores have no directories. A directory exists when some key lives
//! below it; `mkdir` makes an empty one visible by writing a zero-byte
//! `DIRECTORY_MARKER` object inside it. Markers are hidden from listings.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use object_store::path::Path;
use object_store::{ObjectMeta, ObjectStore};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::errors::{GatewayError, Result};
use crate::metrics;
use crate::storage::{Listing, ObjectInfo, StorageBackend};

/// Name of the placeholder object written by `mkdir`
pub const DIRECTORY_MARKER: &str = ".keep";

/// Storage backend delegating to an `ObjectStore`
///
/// Keys are stored exactly as the client spells them, so the name of an
/// uploaded file comes back unchanged from a listing and can be fed to
/// `delete` as is.
pub struct ObjectStoreBackend {
    store: Arc<dyn ObjectStore>,
    root: String,
}

fn segments(raw: &str) -> impl Iterator<Item = &str> {
    raw.split('/').filter(|s| !s.is_empty())
}

impl ObjectStoreBackend {
    /// Wrap `store`, placing every key below the optional `prefix`
    pub fn new(store: Arc<dyn ObjectStore>, prefix: Option<&str>) -> Self {
        let root = prefix
            .map(|p| segments(p).collect::<Vec<_>>().join("/"))
            .unwrap_or_default();
        Self { store, root }
    }

    /// Map a client path onto a store location below the root
    ///
    /// Segments are joined verbatim; `.`/`..` segments and control
    /// characters cannot be stored and are rejected.
    fn resolve(&self, raw: &str) -> Result<Path> {
        let key = std::iter::once(self.root.as_str())
            .filter(|root| !root.is_empty())
            .chain(segments(raw))
            .collect::<Vec<_>>()
            .join("/");
        Path::parse(&key).map_err(|e| {
            GatewayError::InvalidRequest(format!("unsupported path {:?}: {}", raw, e))
        })
    }

    /// Like `resolve`, but refuses to address the root itself
    fn resolve_entry(&self, raw: &str) -> Result<Path> {
        if segments(raw).next().is_none() {
            return Err(GatewayError::InvalidRequest(format!(
                "path must name an entry below the root, got {:?}",
                raw
            )));
        }
        self.resolve(raw)
    }

    async fn delete_entry(&self, raw: &str) -> Result<()> {
        let location = self.resolve_entry(raw)?;

        match self.store.head(&location).await {
            Ok(_) => {
                self.store.delete(&location).await?;
                debug!(location = %location, "Deleted object");
                return Ok(());
            }
            Err(object_store::Error::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        // Not a file; try it as a directory.
        let marker = location.child(DIRECTORY_MARKER);
        let mut has_marker = false;
        let mut children = self.store.list(Some(&location));
        while let Some(meta) = children.next().await {
            if meta?.location == marker {
                has_marker = true;
            } else {
                return Err(GatewayError::DirectoryNotEmpty {
                    path: raw.to_string(),
                });
            }
        }
        drop(children);

        if !has_marker {
            return Err(GatewayError::NotFound {
                path: raw.to_string(),
            });
        }
        self.store.delete(&marker).await?;
        debug!(location = %location, "Deleted directory");
        Ok(())
    }

    async fn put_entry(&self, raw: &str, data: Bytes) -> Result<()> {
        let location = self.resolve_entry(raw)?;
        self.store.put(&location, data.into()).await?;
        Ok(())
    }

    async fn mkdir_entry(&self, raw: &str) -> Result<()> {
        let location = self.resolve_entry(raw)?;
        match self.store.head(&location).await {
            Ok(_) => {
                return Err(GatewayError::NotADirectory {
                    path: raw.to_string(),
                })
            }
            Err(object_store::Error::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }
        self.store
            .put(&location.child(DIRECTORY_MARKER), Bytes::new().into())
            .await?;
        Ok(())
    }
}

/// Listing entry for `meta` relative to `base`
///
/// Keys directly under `base` become files. Deeper keys collapse into their
/// first path segment, reported once per listing as a directory.
fn entry_for(base: &Path, meta: &ObjectMeta, seen_dirs: &mut HashSet<String>) -> Option<ObjectInfo> {
    let parts: Vec<_> = meta.location.prefix_match(base)?.collect();
    match parts.as_slice() {
        [] => None,
        [name] if name.as_ref().is_empty() || name.as_ref() == DIRECTORY_MARKER => None,
        [name] => Some(ObjectInfo::file(
            name.as_ref(),
            meta.size as u64,
            meta.e_tag.clone(),
            meta.last_modified,
        )),
        [dir, ..] => {
            let dir = dir.as_ref().to_string();
            if seen_dirs.insert(dir.clone()) {
                Some(ObjectInfo::directory(dir, meta.last_modified))
            } else {
                None
            }
        }
    }
}

#[async_trait]
impl StorageBackend for ObjectStoreBackend {
    fn list(&self, path: &str) -> Listing {
        let store = self.store.clone();
        let base = match self.resolve(path) {
            Ok(base) => base,
            Err(e) => {
                return Listing::spawn(|tx| async move {
                    tx.send(Err(e)).await;
                })
            }
        };

        Listing::spawn(move |tx| async move {
            let started = Instant::now();
            let mut seen_dirs = HashSet::new();
            let mut failed = false;
            let mut objects = store.list(Some(&base));

            while let Some(item) = objects.next().await {
                let entry = match item {
                    Ok(meta) => match entry_for(&base, &meta, &mut seen_dirs) {
                        Some(entry) => Ok(entry),
                        None => continue,
                    },
                    Err(e) => {
                        warn!(error = %e, prefix = %base, "Listing failed");
                        failed = true;
                        Err(GatewayError::from(e))
                    }
                };
                if !tx.send(entry).await {
                    debug!(prefix = %base, "Listing consumer went away");
                    break;
                }
                if failed {
                    break;
                }
            }
            metrics::observe_storage("list", started, !failed);
        })
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let started = Instant::now();
        let result = self.delete_entry(path).await;
        metrics::observe_storage("delete", started, result.is_ok());
        result
    }

    async fn put(&self, path: &str, data: Bytes) -> Result<()> {
        let started = Instant::now();
        let result = self.put_entry(path, data).await;
        metrics::observe_storage("put", started, result.is_ok());
        result
    }

    async fn mkdir(&self, path: &str) -> Result<()> {
        let started = Instant::now();
        let result = self.mkdir_entry(path).await;
        metrics::observe_storage("mkdir", started, result.is_ok());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    fn backend() -> (Arc<InMemory>, ObjectStoreBackend) {
        let store = Arc::new(InMemory::new());
        let backend = ObjectStoreBackend::new(store.clone(), None);
        (store, backend)
    }

    async fn names(backend: &ObjectStoreBackend, path: &str) -> Vec<(String, bool)> {
        let mut entries: Vec<_> = backend
            .list(path)
            .drain()
            .await
            .unwrap()
            .into_iter()
            .map(|e| (e.name, e.is_dir))
            .collect();
        entries.sort();
        entries
    }

    #[test]
    fn test_resolve_ignores_redundant_slashes() {
        let (_, backend) = backend();
        assert_eq!(
            backend.resolve("//images///cat.png/").unwrap().as_ref(),
            "images/cat.png"
        );
        assert_eq!(backend.resolve("/").unwrap().as_ref(), "");

        let prefixed = ObjectStoreBackend::new(Arc::new(InMemory::new()), Some("/tenant-a/"));
        assert_eq!(
            prefixed.resolve("/images/cat.png").unwrap().as_ref(),
            "tenant-a/images/cat.png"
        );
    }

    #[test]
    fn test_resolve_keeps_special_characters() {
        let (_, backend) = backend();
        assert_eq!(
            backend.resolve("/images/photo[1] 50%.png").unwrap().as_ref(),
            "images/photo[1] 50%.png"
        );
        assert!(matches!(
            backend.resolve("/images/../secret"),
            Err(GatewayError::InvalidRequest(_))
        ));
        assert!(backend.resolve("/bad\u{7}name").is_err());
    }

    #[tokio::test]
    async fn test_special_characters_round_trip() {
        let (store, backend) = backend();
        let name = "photo[1] 50%.png";
        backend
            .put(&format!("/images/{name}"), Bytes::from_static(b"png"))
            .await
            .unwrap();
        assert!(store
            .head(&Path::parse(format!("images/{name}")).unwrap())
            .await
            .is_ok());

        let listed = names(&backend, "/images/").await;
        assert_eq!(listed, vec![(name.to_string(), false)]);

        backend.delete(&format!("/images/{}", listed[0].0)).await.unwrap();
        assert!(names(&backend, "/images/").await.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_path_fails_listing() {
        let (_, backend) = backend();
        assert!(matches!(
            backend.list("/a/./b").drain().await,
            Err(GatewayError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_list_reports_files_and_directories_once() {
        let (_, backend) = backend();
        backend.put("/readme.md", Bytes::from_static(b"hello")).await.unwrap();
        backend.put("/images/a.png", Bytes::from_static(b"a")).await.unwrap();
        backend.put("/images/b.png", Bytes::from_static(b"b")).await.unwrap();
        backend.put("/images/2024/c.png", Bytes::from_static(b"c")).await.unwrap();

        assert_eq!(
            names(&backend, "/").await,
            vec![("images".to_string(), true), ("readme.md".to_string(), false)]
        );
        assert_eq!(
            names(&backend, "/images/").await,
            vec![
                ("2024".to_string(), true),
                ("a.png".to_string(), false),
                ("b.png".to_string(), false)
            ]
        );
    }

    #[tokio::test]
    async fn test_file_entry_metadata() {
        let (_, backend) = backend();
        backend.put("/docs/guide.pdf", Bytes::from_static(b"%PDF-1.7")).await.unwrap();
        let entries = backend.list("/docs").drain().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].size, 8);
        assert_eq!(entries[0].content_type, "application/pdf");
        assert!(!entries[0].is_dir);
    }

    #[tokio::test]
    async fn test_mkdir_creates_visible_empty_directory() {
        let (store, backend) = backend();
        backend.mkdir("/new").await.unwrap();
        backend.mkdir("/new").await.unwrap();

        assert_eq!(names(&backend, "/").await, vec![("new".to_string(), true)]);
        assert!(names(&backend, "/new").await.is_empty());
        assert!(store.head(&Path::from("new/.keep")).await.is_ok());
    }

    #[tokio::test]
    async fn test_mkdir_over_file_fails() {
        let (_, backend) = backend();
        backend.put("/notes", Bytes::from_static(b"x")).await.unwrap();
        assert!(matches!(
            backend.mkdir("/notes").await,
            Err(GatewayError::NotADirectory { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_file() {
        let (_, backend) = backend();
        backend.put("/a.txt", Bytes::from_static(b"a")).await.unwrap();
        backend.delete("/a.txt").await.unwrap();
        assert!(names(&backend, "/").await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_path_fails() {
        let (_, backend) = backend();
        assert!(matches!(
            backend.delete("/nope.txt").await,
            Err(GatewayError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_directory_only_when_empty() {
        let (_, backend) = backend();
        backend.mkdir("/albums").await.unwrap();
        backend.put("/albums/one.jpg", Bytes::from_static(b"1")).await.unwrap();

        assert!(matches!(
            backend.delete("/albums").await,
            Err(GatewayError::DirectoryNotEmpty { .. })
        ));

        backend.delete("/albums/one.jpg").await.unwrap();
        backend.delete("/albums/").await.unwrap();
        assert!(names(&backend, "/").await.is_empty());
    }

    #[tokio::test]
    async fn test_root_cannot_be_addressed() {
        let (_, backend) = backend();
        assert!(matches!(
            backend.delete("/").await,
            Err(GatewayError::InvalidRequest(_))
        ));
        assert!(backend.mkdir("").await.is_err());
        assert!(backend.put("//", Bytes::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_prefix_isolates_keys() {
        let store = Arc::new(InMemory::new());
        let backend = ObjectStoreBackend::new(store.clone(), Some("tenant"));
        backend.put("/x.bin", Bytes::from_static(b"x")).await.unwrap();

        assert!(store.head(&Path::from("tenant/x.bin")).await.is_ok());
        assert_eq!(names(&backend, "/").await, vec![("x.bin".to_string(), false)]);
    }
}
