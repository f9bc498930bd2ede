//! Azure Blob Storage client construction
//!
//! The bucket names the container, the operator names the storage account
//! and the secret is the account access key. With no secret the builder
//! uses its default credential discovery (managed identity, environment).

use object_store::azure::MicrosoftAzureBuilder;
use object_store::ObjectStore;
use std::sync::Arc;

use crate::config::BackendConfig;
use crate::errors::{GatewayError, Result};

/// Build an Azure Blob client for the configured container
pub fn build(config: &BackendConfig) -> Result<Arc<dyn ObjectStore>> {
    let account = config.operator.as_deref().ok_or_else(|| {
        GatewayError::Config("Azure backend needs the storage account as operator".to_string())
    })?;

    let mut builder = MicrosoftAzureBuilder::from_env()
        .with_account(account)
        .with_container_name(&config.bucket);

    if let Some(secret) = &config.secret {
        builder = builder.with_access_key(secret);
    }
    if config.allow_http {
        builder = builder.with_allow_http(true);
    }

    Ok(Arc::new(builder.build()?))
}
