//! JSON error bodies for unknown routes and unsupported methods

use crate::error::ApiError;

/// Router fallback (404)
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Page Not Found".to_string())
}

/// Method fallback on known routes (405)
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
