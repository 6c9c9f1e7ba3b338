//! Pre-check endpoint
//!
//! `POST /ping` asks whether a submission fingerprint is already known.
//! The fingerprint is read from a `hash` form field, or from a `hash` key of a
//! JSON object body for any other content type. Never writes.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::StatusCode,
    Form,
};
use serde::Deserialize;
use tracing::{debug, warn};

use super::media_type;
use crate::error::{ApiError, ApiResult};
use crate::hash_index::Precheck;
use crate::AppState;

/// Pre-check request body
#[derive(Debug, Deserialize)]
pub struct PingRequest {
    #[serde(default)]
    pub hash: Option<String>,
}

/// **POST /ping**
///
/// - `201 Created`: fingerprint already accepted, do not resubmit
/// - `204 No Content`: fingerprint unknown, proceed with the submission
/// - `400 Bad Request`: no non-empty `hash` in the request
/// - `413 Payload Too Large`: body exceeds the configured limit
pub async fn ping(State(state): State<AppState>, request: Request) -> ApiResult<StatusCode> {
    let fingerprint = read_fingerprint(request, &state).await?;

    let outcome = state.hash_index.precheck(&fingerprint).await.map_err(|e| {
        warn!(error = %e, "Pre-check lookup failed");
        ApiError::from(e)
    })?;

    debug!(fingerprint = %fingerprint, ?outcome, "Pre-check");

    Ok(match outcome {
        Precheck::Known => StatusCode::CREATED,
        Precheck::Unknown => StatusCode::NO_CONTENT,
    })
}

async fn read_fingerprint(request: Request, state: &AppState) -> ApiResult<String> {
    let is_form = media_type(request.headers()).as_deref()
        == Some("application/x-www-form-urlencoded");

    let ping = if is_form {
        let Form(ping) = Form::<PingRequest>::from_request(request, state)
            .await
            .map_err(ApiError::from)?;
        ping
    } else {
        let body = Bytes::from_request(request, state)
            .await
            .map_err(ApiError::from)?;
        serde_json::from_slice::<PingRequest>(&body)
            .map_err(|e| ApiError::BadRequest(format!("Pre-check body must carry a hash: {}", e)))?
    };

    ping.hash
        .filter(|hash| !hash.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing hash".to_string()))
}
