//! Error types for scinet-api
//!
//! Client errors (unsupported media, malformed body, bad pre-check) are
//! reported without side effects. Server errors after the raw write name the
//! raw payload id so the submission can be replayed.

use axum::{
    extract::rejection::{BytesRejection, FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::controller::CommitFailure;
use crate::hash_index::LookupError;
use crate::raw_store::RawStoreError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Content type is not JSON (415)
    #[error("Unsupported content type: {0}")]
    UnsupportedMedia(String),

    /// Body is not valid JSON (400)
    #[error("Malformed JSON payload: {0}")]
    MalformedPayload(String),

    /// Body exceeds the configured limit (413)
    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Unknown route (404)
    #[error("{0}")]
    NotFound(String),

    /// Known route, wrong method (405)
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// Raw store or hash index unreachable (503, retryable)
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Structured commit failed after the raw payload was stored (503, retryable)
    #[error("Commit of submission {id} failed: {reason}")]
    CommitFailure { id: Uuid, reason: String },
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::UnsupportedMedia(_) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_MEDIA"),
            ApiError::MalformedPayload(_) => (StatusCode::BAD_REQUEST, "MALFORMED_PAYLOAD"),
            ApiError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED"),
            ApiError::StorageUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE"),
            ApiError::CommitFailure { .. } => (StatusCode::SERVICE_UNAVAILABLE, "COMMIT_FAILURE"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = match &self {
            ApiError::CommitFailure { id, .. } => json!({
                "error": self.to_string(),
                "code": code,
                "id": id,
            }),
            _ => json!({
                "error": self.to_string(),
                "code": code,
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

impl From<RawStoreError> for ApiError {
    fn from(err: RawStoreError) -> Self {
        ApiError::StorageUnavailable(err.to_string())
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::EmptyFingerprint => ApiError::BadRequest(err.to_string()),
            LookupError::Unavailable(_) => ApiError::StorageUnavailable(err.to_string()),
        }
    }
}

impl From<CommitFailure> for ApiError {
    fn from(err: CommitFailure) -> Self {
        ApiError::CommitFailure {
            id: err.id,
            reason: err.source.to_string(),
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
