//! HTTP API handlers for scinet-api

pub mod fallback;
pub mod health;
pub mod ping;
pub mod raw;
pub mod ui;

pub use fallback::{method_not_allowed, not_found};
pub use health::health_routes;
pub use ping::ping;
pub use raw::submit_raw;
pub use ui::serve_index;

use axum::http::{header::CONTENT_TYPE, HeaderMap};

/// Media type essence of the Content-Type header, lowercased, without
/// parameters (`application/json; charset=utf-8` -> `application/json`)
pub(crate) fn media_type(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    let essence = value.split(';').next().unwrap_or_default().trim();
    if essence.is_empty() {
        None
    } else {
        Some(essence.to_ascii_lowercase())
    }
}
