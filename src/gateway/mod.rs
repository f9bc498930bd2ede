//! Gateway service
//!
//! One function per operation, each mapping validated input to an envelope
//! or a `GatewayError`. The storage backend and public domain are injected
//! at startup and shared read-only across requests.

mod operation;
mod upload;

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::envelope::{List, Response};
use crate::errors::Result;
use crate::storage::StorageBackend;

pub use operation::Operation;
pub use upload::UploadForm;

/// Deadline for one operation unless configured otherwise
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(300);

pub struct Gateway {
    storage: Arc<dyn StorageBackend>,
    domain: String,
    timeout: Duration,
}

impl Gateway {
    pub fn new(storage: Arc<dyn StorageBackend>, domain: impl Into<String>) -> Self {
        Self {
            storage,
            domain: domain.into(),
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Bound every operation, upload body included, by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Entries directly under `path`
    pub async fn list(&self, path: &str) -> Result<List> {
        let entries = self.storage.list(path).drain().await?;
        info!(path = %path, count = entries.len(), "Listed directory");
        Ok(List::new(self.domain.clone(), entries))
    }

    pub async fn delete(&self, path: &str) -> Result<Response> {
        self.storage.delete(path).await?;
        info!(path = %path, "Deleted");
        Ok(Response::ok())
    }

    /// Store the file at `path + file name`; the data is its public URL
    pub async fn upload(&self, form: UploadForm) -> Result<Response> {
        let (path, file) = form.into_file()?;
        let key = format!("{}{}", path, file.file_name);
        let size = file.content.len();

        self.storage.put(&key, file.content).await?;
        info!(key = %key, size, "Uploaded");
        Ok(Response::ok_with_data(format!("{}{}", self.domain, key)))
    }

    pub async fn mkdir(&self, dir: &str) -> Result<Response> {
        self.storage.mkdir(dir).await?;
        info!(dir = %dir, "Created directory");
        Ok(Response::ok())
    }

    pub fn domain(&self) -> Response {
        Response::message(self.domain.clone())
    }
}
