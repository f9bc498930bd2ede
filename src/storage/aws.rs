//! AWS S3 client construction
//!
//! The operator identifier and secret are used as the access key id and
//! secret access key. Without them the builder falls back to the default
//! AWS credential chain (environment, instance metadata, IRSA).

use object_store::aws::AmazonS3Builder;
use object_store::ObjectStore;
use std::sync::Arc;

use crate::config::BackendConfig;
use crate::errors::{GatewayError, Result};

/// Build an S3 client for the configured bucket
pub fn build(config: &BackendConfig) -> Result<Arc<dyn ObjectStore>> {
    let mut builder = AmazonS3Builder::from_env()
        .with_bucket_name(&config.bucket)
        .with_region(&config.region);

    match (&config.operator, &config.secret) {
        (Some(operator), Some(secret)) => {
            builder = builder
                .with_access_key_id(operator)
                .with_secret_access_key(secret);
        }
        (None, None) => {}
        _ => {
            return Err(GatewayError::Config(
                "AWS backend needs both operator and secret, or neither".to_string(),
            ))
        }
    }

    // S3-compatible services such as MinIO
    if let Some(endpoint) = &config.endpoint {
        builder = builder.with_endpoint(endpoint);
    }
    if config.allow_http {
        builder = builder.with_allow_http(true);
    }

    Ok(Arc::new(builder.build()?))
}
