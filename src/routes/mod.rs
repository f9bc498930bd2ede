//! HTTP routes
//!
//! - ANY /?operate=list|delete|upload|mkdir|domain - gateway endpoint
//! - GET /healthz - health check
//! - GET /metrics - Prometheus metrics
//!
//! Every response of the gateway endpoint carries permissive CORS headers
//! and the JSON content type, whatever its outcome.

mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::gateway::Gateway;

pub const ALLOWED_METHODS: &str = "GET, POST, PATCH, PUT, OPTIONS";
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// Create the gateway router
pub fn create_router(gateway: Arc<Gateway>, max_upload_size: usize) -> Router {
    let endpoint: Router<Arc<Gateway>> = Router::new()
        .route("/", any(handlers::gateway))
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static("*"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static("*"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static(ALLOWED_METHODS),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(JSON_CONTENT_TYPE),
                ))
                .layer(DefaultBodyLimit::max(max_upload_size)),
        );

    Router::new()
        .route("/healthz", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .merge(endpoint)
        .with_state(gateway)
}
