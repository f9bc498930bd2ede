//! Google Cloud Storage client construction
//!
//! The secret, when present, is a service account key in JSON form.
//! Otherwise Application Default Credentials apply (Workload Identity,
//! GOOGLE_APPLICATION_CREDENTIALS, GCE metadata server).

use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::ObjectStore;
use std::sync::Arc;

use crate::config::BackendConfig;
use crate::errors::Result;

/// Build a GCS client for the configured bucket
pub fn build(config: &BackendConfig) -> Result<Arc<dyn ObjectStore>> {
    let mut builder = GoogleCloudStorageBuilder::from_env().with_bucket_name(&config.bucket);

    if let Some(key) = &config.secret {
        builder = builder.with_service_account_key(key);
    }

    Ok(Arc::new(builder.build()?))
}
