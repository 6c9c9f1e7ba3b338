//! scinet-api library - article submission ingestion service
//!
//! Pre-checks submission fingerprints, stores every accepted JSON body
//! verbatim, then commits a normalized record and its group counter updates.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use scinet_common::config::{RootFolder, DEFAULT_MAX_BODY_BYTES};
use scinet_common::db::init_database;

pub mod api;
pub mod controller;
pub mod error;
pub mod hash_index;
pub mod raw_store;

pub use crate::error::{ApiError, ApiResult};

use crate::controller::SubmissionController;
use crate::hash_index::HashIndex;
use crate::raw_store::RawStore;

/// Application state shared across HTTP handlers
///
/// Built once at startup and cloned into each request. Every field is a
/// handle onto pooled or immutable resources, so clones share no mutable
/// state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    pub hash_index: HashIndex,
    pub raw_store: RawStore,
    pub controller: SubmissionController,
    /// Largest accepted request body, in bytes
    pub max_body_bytes: usize,
}

impl AppState {
    /// Create application state from an open pool and raw store
    pub fn new(db: SqlitePool, raw_store: RawStore) -> Self {
        Self {
            hash_index: HashIndex::new(db.clone()),
            controller: SubmissionController::new(db.clone()),
            raw_store,
            db,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Replace the request body limit
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Open the database and raw payload directory under `root`, creating
    /// them if missing
    pub async fn open(root: &RootFolder) -> anyhow::Result<Self> {
        root.ensure_directories_exist()?;
        let db = init_database(&root.database_path()).await?;
        let raw_store = RawStore::open(root.raw_payload_path()).await?;
        Ok(Self::new(db, raw_store))
    }
}

/// Build application router
///
/// Bodies larger than `state.max_body_bytes` are rejected with 413 before
/// any handler logic runs.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;

    Router::new()
        .route(
            "/",
            get(api::serve_index).fallback(api::method_not_allowed),
        )
        .route(
            "/index",
            get(api::serve_index).fallback(api::method_not_allowed),
        )
        .route("/ping", post(api::ping).fallback(api::method_not_allowed))
        .route("/raw", post(api::submit_raw).fallback(api::method_not_allowed))
        .merge(api::health_routes())
        .fallback(api::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
