//! Request handlers

use axum::{
    extract::{FromRequest, Multipart, Query, Request, State},
    http::StatusCode,
    response::IntoResponse,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, instrument, Span};

use crate::envelope::{Reply, Response};
use crate::errors::{GatewayError, Result};
use crate::gateway::{Gateway, Operation, UploadForm};
use crate::metrics;

/// Health check endpoint
#[instrument]
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Prometheus metrics endpoint
#[instrument]
pub async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = metrics::REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Metrics encoding failed");
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }
    (
        [(axum::http::header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}

/// Gateway endpoint - ANY /?operate=...
///
/// Always answers 200. Failures, including running past the operation
/// deadline, are reported inside the envelope with the operation's error
/// prefix; an unknown operation gets an empty body.
#[instrument(skip_all, fields(operate = tracing::field::Empty))]
pub async fn gateway(
    State(gateway): State<Arc<Gateway>>,
    Query(params): Query<Vec<(String, String)>>,
    request: Request,
) -> Reply {
    let started = Instant::now();
    let operation = Operation::from_params(&params);
    let operate = operation.as_ref().map_or("none", Operation::name);
    Span::current().record("operate", operate);

    let reply = match operation {
        None => Reply::Empty,
        Some(operation) => {
            let prefix = operation.failure_prefix();
            let deadline = gateway.timeout();
            let outcome = tokio::time::timeout(deadline, run(&gateway, operation, request))
                .await
                .unwrap_or(Err(GatewayError::Timeout(deadline)));
            match outcome {
                Ok(reply) => reply,
                Err(e) => {
                    error!(error = %e, "Operation failed");
                    Response::failure(prefix, &e).into()
                }
            }
        }
    };

    metrics::observe_request(operate, reply.code(), started);
    reply
}

async fn run(gateway: &Gateway, operation: Operation, request: Request) -> Result<Reply> {
    let reply: Reply = match operation {
        Operation::List { path } => gateway.list(&path).await?.into(),
        Operation::Delete { path } => gateway.delete(&path).await?.into(),
        Operation::Upload => {
            let multipart = Multipart::from_request(request, &()).await?;
            let form = UploadForm::read(multipart).await?;
            gateway.upload(form).await?.into()
        }
        Operation::Mkdir { dir } => gateway.mkdir(&dir).await?.into(),
        Operation::Domain => gateway.domain().into(),
    };
    Ok(reply)
}
