//! JSON response envelopes
//!
//! Every reply of the gateway endpoint is one of:
//! - `Response`: `{"code", "message", "data"}`
//! - `List`: `{"code", "count", "message", "data": [ObjectInfo]}`
//! - an empty body, when no operation was requested
//!
//! The HTTP status is always 200; the outcome lives in `code`.

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde::Serialize;

use crate::errors::GatewayError;
use crate::storage::ObjectInfo;

pub const CODE_OK: u16 = 200;
pub const CODE_ERROR: u16 = 500;

/// Basic envelope returned by every operation except `list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub code: u16,
    pub message: String,
    pub data: Option<String>,
}

impl Response {
    /// `{"code":200,"message":"ok","data":null}`
    pub fn ok() -> Self {
        Self {
            code: CODE_OK,
            message: "ok".to_string(),
            data: None,
        }
    }

    pub fn ok_with_data(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            ..Self::ok()
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: CODE_OK,
            message: message.into(),
            data: None,
        }
    }

    /// Failure envelope, e.g. `ErrorDelete:not found: /a.txt`
    pub fn failure(prefix: &str, err: &GatewayError) -> Self {
        Self {
            code: CODE_ERROR,
            message: format!("{}{}", prefix, err),
            data: None,
        }
    }
}

/// Listing envelope
#[derive(Debug, Clone, Serialize)]
pub struct List {
    pub code: u16,
    pub count: usize,
    pub message: String,
    pub data: Vec<ObjectInfo>,
}

impl List {
    /// Successful listing; `message` carries the public domain.
    pub fn new(domain: impl Into<String>, entries: Vec<ObjectInfo>) -> Self {
        Self {
            code: CODE_OK,
            count: entries.len(),
            message: domain.into(),
            data: entries,
        }
    }
}

/// Everything the gateway endpoint may answer with
#[derive(Debug, Clone)]
pub enum Reply {
    Response(Response),
    List(List),
    Empty,
}

impl Reply {
    /// Envelope code, `None` for an empty reply
    pub fn code(&self) -> Option<u16> {
        match self {
            Reply::Response(r) => Some(r.code),
            Reply::List(l) => Some(l.code),
            Reply::Empty => None,
        }
    }

    fn to_body(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            Reply::Response(r) => serde_json::to_vec(r),
            Reply::List(l) => serde_json::to_vec(l),
            Reply::Empty => Ok(Vec::new()),
        }
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply::Response(response)
    }
}

impl From<List> for Reply {
    fn from(list: List) -> Self {
        Reply::List(list)
    }
}

/// Last-resort body when even the failure envelope cannot be encoded
const ENCODE_FAILURE_BODY: &str = r#"{"code":500,"message":"ErrorEncode:","data":null}"#;

/// Body reporting that the reply itself could not be encoded
fn encode_failure(err: &GatewayError) -> Vec<u8> {
    serde_json::to_vec(&Response::failure("ErrorEncode:", err))
        .unwrap_or_else(|_| ENCODE_FAILURE_BODY.as_bytes().to_vec())
}

impl IntoResponse for Reply {
    fn into_response(self) -> axum::response::Response {
        let body = match self.to_body() {
            Ok(body) => body,
            Err(e) => {
                let err = GatewayError::from(e);
                tracing::error!(error = %err, "Envelope serialization failed");
                encode_failure(&err)
            }
        };

        let mut response = axum::response::Response::new(Body::empty());
        *response.status_mut() = StatusCode::OK;
        response
            .headers_mut()
            .insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
        *response.body_mut() = Body::from(body);
        response
    }
}
