//! Raw submission endpoint
//!
//! `POST /raw` runs one ingestion attempt:
//! content type check -> JSON parse -> new id -> raw write -> structured commit.
//! Nothing is written unless the first two steps pass, and the commit is only
//! attempted once the raw body is on disk.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use scinet_common::uuid_utils;

use super::media_type;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /raw response
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub id: Uuid,
    pub groups_counted: Vec<String>,
}

/// **POST /raw**
///
/// - `201 Created`: raw payload stored and record committed
/// - `415 Unsupported Media Type`: content type is not `application/json`
/// - `400 Bad Request`: body is not valid JSON
/// - `413 Payload Too Large`: body exceeds the configured limit
/// - `503 Service Unavailable`: raw store or commit failed (retryable)
pub async fn submit_raw(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<(StatusCode, Json<SubmitResponse>)> {
    let content_type = media_type(&headers);
    if content_type.as_deref() != Some("application/json") {
        warn!(content_type = ?content_type, "Rejected submission with unsupported content type");
        return Err(ApiError::UnsupportedMedia(
            content_type.unwrap_or_else(|| "none".to_string()),
        ));
    }

    let body = body.map_err(|rejection| {
        warn!(status = %rejection.status(), "Rejected unreadable submission body");
        ApiError::from(rejection)
    })?;

    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Rejected malformed JSON submission");
        ApiError::MalformedPayload(e.to_string())
    })?;

    let id = uuid_utils::generate();

    state.raw_store.put(id, &body).await.map_err(|e| {
        error!(%id, error = %e, "Raw payload write failed, aborting submission");
        ApiError::from(e)
    })?;

    let accepted = state.controller.submit(payload, id).await.map_err(|e| {
        error!(%id, error = %e, "Structured commit failed, raw payload kept for replay");
        ApiError::from(e)
    })?;

    info!(
        %id,
        groups_counted = accepted.counted_groups.len(),
        "Submission accepted"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            id: accepted.id,
            groups_counted: accepted.counted_groups,
        }),
    ))
}
