//! Renders errors as JSON response bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// The numeric HTTP status code, e.g. 404.
    pub status_code: u16,
    /// A human readable description of what went wrong.
    pub message: String,
    /// The canonical reason phrase for the status code, e.g. "Not Found".
    pub error: String,
}

impl ErrorBody {
    /// Create an error body for `status` with `message`.
    pub fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.to_owned(),
            error: status.canonical_reason().unwrap_or("Unknown").to_owned(),
        }
    }
}

pub(crate) fn render_error(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody::new(status, message))).into_response()
}
