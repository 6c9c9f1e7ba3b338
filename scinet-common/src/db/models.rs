//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Normalized, committed form of an accepted submission
///
/// Shares its `id` with the raw payload file written before the commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: Uuid,
    /// Client-computed content hash, when the payload carried one
    pub fingerprint: Option<String>,
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub doi: Option<String>,
    /// Group identifiers referenced by the payload (deduplicated)
    pub groups: Vec<String>,
    /// The parsed payload as received
    pub payload: Value,
    pub received_at: DateTime<Utc>,
}

/// Named collection with a running submission count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub submissions: i64,
}
