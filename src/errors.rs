//! Error types for the storage gateway
//!
//! Every failure the gateway can produce is a `GatewayError`. Request-time
//! errors never become HTTP error statuses; they are folded into the JSON
//! envelope by the request router (see `envelope::Response::failure`).

use axum::extract::multipart::{MultipartError, MultipartRejection};
use thiserror::Error;

/// Main error type for gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Storage backend operation failed
    #[error("{0}")]
    Storage(#[from] object_store::Error),

    /// Nothing exists at the requested path
    #[error("not found: {path}")]
    NotFound { path: String },

    /// Directory still holds entries other than its marker
    #[error("directory not empty: {path}")]
    DirectoryNotEmpty { path: String },

    /// A file already occupies the requested directory path
    #[error("not a directory: {path}")]
    NotADirectory { path: String },

    /// Missing or invalid request input
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Malformed multipart form
    #[error("malformed multipart form: {0}")]
    Multipart(String),

    /// Listing producer stopped without completing
    #[error("listing aborted: {0}")]
    Listing(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Operation did not finish within the configured deadline
    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<MultipartError> for GatewayError {
    fn from(err: MultipartError) -> Self {
        GatewayError::Multipart(err.body_text())
    }
}

impl From<MultipartRejection> for GatewayError {
    fn from(rejection: MultipartRejection) -> Self {
        GatewayError::Multipart(rejection.body_text())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_the_path() {
        let err = GatewayError::NotFound {
            path: "/missing.txt".into(),
        };
        assert_eq!(err.to_string(), "not found: /missing.txt");

        let err = GatewayError::DirectoryNotEmpty {
            path: "/photos".into(),
        };
        assert_eq!(err.to_string(), "directory not empty: /photos");
    }

    #[test]
    fn test_timeout_message() {
        let err = GatewayError::Timeout(std::time::Duration::from_millis(1500));
        assert_eq!(err.to_string(), "operation timed out after 1.5s");
    }

    #[test]
    fn test_storage_error_is_passed_through() {
        let err = GatewayError::from(object_store::Error::NotImplemented);
        assert_eq!(err.to_string(), object_store::Error::NotImplemented.to_string());
    }
}
