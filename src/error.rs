//! Per-request failures and their HTTP mapping.
//!
//! Every failure is handled at the boundary of the request it happened in
//! and turned into a complete plaintext response.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReflectError {
    /// Reading the request body failed (client abort, network error).
    #[error("failed to read request body: {0}")]
    BodyRead(#[source] axum::Error),

    /// `/collect` body is not valid JSON.
    #[error("invalid client payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// `/collect` body is valid JSON but not an object.
    #[error("client payload must be a JSON object")]
    PayloadNotObject,

    #[error("method not allowed")]
    MethodNotAllowed,

    /// The page template failed to render.
    #[error("failed to render page: {0}")]
    Render(#[from] std::fmt::Error),
}

impl ReflectError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReflectError::BodyRead(_) | ReflectError::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ReflectError::InvalidPayload(_) | ReflectError::PayloadNotObject => {
                StatusCode::BAD_REQUEST
            }
            ReflectError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Text shown to the client. Internal detail stays in the logs.
    fn public_message(&self) -> &'static str {
        match self {
            ReflectError::BodyRead(_) => "failed to read request body",
            ReflectError::InvalidPayload(_) | ReflectError::PayloadNotObject => {
                "invalid client payload"
            }
            ReflectError::MethodNotAllowed => "method not allowed",
            ReflectError::Render(_) => "failed to render page",
        }
    }
}

impl IntoResponse for ReflectError {
    fn into_response(self) -> Response {
        match &self {
            ReflectError::BodyRead(_) | ReflectError::Render(_) => {
                tracing::error!(error = %self, "Request failed");
            }
            ReflectError::InvalidPayload(_) | ReflectError::PayloadNotObject => {
                tracing::warn!(error = %self, "Rejected client payload");
            }
            ReflectError::MethodNotAllowed => {}
        }

        let mut response = (self.status_code(), self.public_message()).into_response();
        if matches!(self, ReflectError::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}
