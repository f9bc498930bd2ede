//! Configuration management for the storage gateway
//!
//! Supports configuration via:
//! - Environment variables (primary)
//! - Optional TOML config file (secondary)
//!
//! Environment variables take precedence over config file values.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;

/// Backend storage type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// AWS S3 or any S3-compatible service
    Aws,
    /// Azure Blob Storage
    Azure,
    /// Google Cloud Storage
    Gcp,
    /// Directory on the local filesystem
    Local,
    /// Process-local memory, lost on restart
    Memory,
}

impl FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aws" | "s3" => Ok(BackendType::Aws),
            "azure" => Ok(BackendType::Azure),
            "gcp" | "gcs" | "google" => Ok(BackendType::Gcp),
            "local" | "fs" => Ok(BackendType::Local),
            "memory" | "mem" => Ok(BackendType::Memory),
            _ => Err(format!("Unknown backend type: {}", s)),
        }
    }
}

/// Backend storage configuration
///
/// `operator` and `secret` are forwarded to the provider as static
/// credentials: access key id and secret for AWS, account name and access
/// key for Azure. GCP only uses `secret`, as a service account key JSON.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend type
    #[serde(rename = "type")]
    pub backend_type: BackendType,

    /// Bucket or container name; root directory for the local backend
    #[serde(default)]
    pub bucket: String,

    /// Operator identifier
    #[serde(default)]
    pub operator: Option<String>,

    /// Operator secret
    #[serde(default)]
    pub secret: Option<String>,

    /// Optional key prefix for all objects
    #[serde(default)]
    pub prefix: Option<String>,

    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,

    /// Endpoint URL for S3-compatible services
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Allow plain http endpoints
    #[serde(default)]
    pub allow_http: bool,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("backend_type", &self.backend_type)
            .field("bucket", &self.bucket)
            .field("operator", &self.operator)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("prefix", &self.prefix)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("allow_http", &self.allow_http)
            .finish()
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Request timeout in seconds (default: 300)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Max request body size in bytes (default: 32MiB)
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_max_upload_size() -> usize {
    32 << 20
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            timeout_secs: default_timeout_secs(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Backend storage configuration
    pub backend: BackendConfig,

    /// Public domain prepended to uploaded paths, e.g. `https://cdn.example.com`
    #[serde(default)]
    pub domain: String,

    /// Log level (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            backend: BackendConfig {
                backend_type: BackendType::Memory,
                bucket: String::new(),
                operator: None,
                secret: None,
                prefix: None,
                region: default_region(),
                endpoint: None,
                allow_http: false,
            },
            domain: String::new(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - GATEWAY_BACKEND_TYPE: aws|azure|gcp|local|memory
    /// - GATEWAY_BUCKET: bucket/container name, or root directory for local
    /// - GATEWAY_OPERATOR: operator identifier
    /// - GATEWAY_SECRET: operator secret
    /// - GATEWAY_PREFIX: optional key prefix
    /// - GATEWAY_REGION: AWS region (default: us-east-1)
    /// - GATEWAY_ENDPOINT: custom endpoint URL (optional)
    /// - GATEWAY_ALLOW_HTTP: allow http endpoints (default: false)
    /// - GATEWAY_DOMAIN: public domain used to build download URLs
    /// - GATEWAY_BIND_ADDRESS: server bind address (default: 0.0.0.0:8080)
    /// - GATEWAY_TIMEOUT_SECS: request timeout (default: 300)
    /// - GATEWAY_MAX_UPLOAD_SIZE: max request size in bytes (default: 32MiB)
    /// - GATEWAY_LOG_LEVEL: log level (default: info)
    /// - GATEWAY_CONFIG_FILE: optional path to TOML config file
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match var("GATEWAY_CONFIG_FILE") {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(backend_type) = var("GATEWAY_BACKEND_TYPE") {
            config.backend.backend_type =
                BackendType::from_str(&backend_type).map_err(anyhow::Error::msg)?;
        }
        if let Some(bucket) = var("GATEWAY_BUCKET") {
            config.backend.bucket = bucket;
        }
        if let Some(operator) = var("GATEWAY_OPERATOR") {
            config.backend.operator = Some(operator);
        }
        if let Some(secret) = var("GATEWAY_SECRET") {
            config.backend.secret = Some(secret);
        }
        if let Some(prefix) = var("GATEWAY_PREFIX") {
            config.backend.prefix = Some(prefix);
        }
        if let Some(region) = var("GATEWAY_REGION") {
            config.backend.region = region;
        }
        if let Some(endpoint) = var("GATEWAY_ENDPOINT") {
            config.backend.endpoint = Some(endpoint);
        }
        if let Some(allow_http) = var("GATEWAY_ALLOW_HTTP") {
            config.backend.allow_http = allow_http
                .parse()
                .with_context(|| format!("invalid GATEWAY_ALLOW_HTTP: {}", allow_http))?;
        }
        if let Some(domain) = var("GATEWAY_DOMAIN") {
            config.domain = domain;
        }
        if let Some(addr) = var("GATEWAY_BIND_ADDRESS") {
            config.server.bind_address = addr
                .parse()
                .with_context(|| format!("invalid GATEWAY_BIND_ADDRESS: {}", addr))?;
        }
        if let Some(timeout) = var("GATEWAY_TIMEOUT_SECS") {
            config.server.timeout_secs = timeout
                .parse()
                .with_context(|| format!("invalid GATEWAY_TIMEOUT_SECS: {}", timeout))?;
        }
        if let Some(size) = var("GATEWAY_MAX_UPLOAD_SIZE") {
            config.server.max_upload_size = size
                .parse()
                .with_context(|| format!("invalid GATEWAY_MAX_UPLOAD_SIZE: {}", size))?;
        }
        if let Some(level) = var("GATEWAY_LOG_LEVEL") {
            config.log_level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path))?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        match self.backend.backend_type {
            BackendType::Memory => {}
            BackendType::Local if self.backend.bucket.is_empty() => {
                bail!("local backend requires GATEWAY_BUCKET to name a root directory")
            }
            _ if self.backend.bucket.is_empty() => {
                bail!("{:?} backend requires GATEWAY_BUCKET", self.backend.backend_type)
            }
            _ => {}
        }
        if self.server.max_upload_size == 0 {
            bail!("max_upload_size must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_backend_type_parsing() {
        assert_eq!(BackendType::from_str("aws").unwrap(), BackendType::Aws);
        assert_eq!(BackendType::from_str("S3").unwrap(), BackendType::Aws);
        assert_eq!(BackendType::from_str("azure").unwrap(), BackendType::Azure);
        assert_eq!(BackendType::from_str("gcs").unwrap(), BackendType::Gcp);
        assert_eq!(BackendType::from_str("local").unwrap(), BackendType::Local);
        assert_eq!(BackendType::from_str("memory").unwrap(), BackendType::Memory);
        assert!(BackendType::from_str("ftp").is_err());
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = load(&[]).unwrap();
        assert_eq!(config.backend.backend_type, BackendType::Memory);
        assert_eq!(config.server.bind_address.port(), 8080);
        assert_eq!(config.server.max_upload_size, 32 * 1024 * 1024);
        assert_eq!(config.log_level, "info");
        assert!(config.domain.is_empty());
    }

    #[test]
    fn test_environment_overrides() {
        let config = load(&[
            ("GATEWAY_BACKEND_TYPE", "aws"),
            ("GATEWAY_BUCKET", "assets"),
            ("GATEWAY_OPERATOR", "AKIDEXAMPLE"),
            ("GATEWAY_SECRET", "s3cr3t"),
            ("GATEWAY_DOMAIN", "https://cdn.example.com"),
            ("GATEWAY_ALLOW_HTTP", "true"),
            ("GATEWAY_BIND_ADDRESS", "127.0.0.1:9000"),
        ])
        .unwrap();
        assert_eq!(config.backend.backend_type, BackendType::Aws);
        assert_eq!(config.backend.bucket, "assets");
        assert_eq!(config.backend.operator.as_deref(), Some("AKIDEXAMPLE"));
        assert!(config.backend.allow_http);
        assert_eq!(config.domain, "https://cdn.example.com");
        assert_eq!(config.server.bind_address.port(), 9000);
    }

    #[test]
    fn test_cloud_backend_requires_bucket() {
        let err = load(&[("GATEWAY_BACKEND_TYPE", "gcp")]).unwrap_err();
        assert!(err.to_string().contains("GATEWAY_BUCKET"));
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        assert!(load(&[("GATEWAY_TIMEOUT_SECS", "soon")]).is_err());
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let config = load(&[("GATEWAY_SECRET", "hunter2")]).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
            domain = "https://files.example.org"

            [backend]
            type = "local"
            bucket = "/srv/files"

            [server]
            timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.backend_type, BackendType::Local);
        assert_eq!(config.backend.region, "us-east-1");
        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.server.max_upload_size, 32 << 20);
    }
}
