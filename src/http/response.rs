//! Response mapping.
//!
//! # Responsibilities
//! - Map content service results to HTTP status codes
//! - Serialize payloads as JSON
//!
//! # Design Decisions
//! - Fail-open: "no data" for any reason is 404, never 5xx
//! - Invalid arguments are 400 with a JSON error body

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::content::{ContentError, ContentResult};

/// A content API response before serialization.
#[derive(Debug)]
pub enum ApiResponse {
    Found(Value),
    Empty,
    Invalid(String),
}

impl ApiResponse {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiResponse::Found(_) => StatusCode::OK,
            ApiResponse::Empty => StatusCode::NOT_FOUND,
            ApiResponse::Invalid(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<ContentResult<Option<Value>>> for ApiResponse {
    fn from(result: ContentResult<Option<Value>>) -> Self {
        match result {
            Ok(Some(value)) => ApiResponse::Found(value),
            Ok(None) => ApiResponse::Empty,
            Err(ContentError::InvalidArgument(message)) => ApiResponse::Invalid(message),
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiResponse::Found(value) => (status, Json(value)).into_response(),
            ApiResponse::Empty => (status, Json(Value::Null)).into_response(),
            ApiResponse::Invalid(message) => (status, Json(json!({ "error": message }))).into_response(),
        }
    }
}
