//! Submission controller
//!
//! Normalizes an accepted JSON payload into a [`SubmissionRecord`] and commits
//! it together with the group counter increments it implies. The record
//! insert and every increment run in one SQLite transaction: either all of
//! them become visible or none do.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use scinet_common::db::{groups, submissions, SubmissionRecord};
use scinet_common::text::{collapse_whitespace, dotify, extract_doi};

/// Successful commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedResult {
    pub id: Uuid,
    /// Referenced groups that exist and were incremented
    pub counted_groups: Vec<String>,
}

/// Structured commit failed; the raw payload stored under `id` is intact
#[derive(Debug, Error)]
#[error("Commit of submission {id} failed: {source}")]
pub struct CommitFailure {
    pub id: Uuid,
    #[source]
    pub source: scinet_common::Error,
}

#[derive(Clone)]
pub struct SubmissionController {
    db: SqlitePool,
}

impl SubmissionController {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Normalize and commit `payload` under `id`
    ///
    /// Group references that match no stored group are skipped without error.
    pub async fn submit(&self, payload: Value, id: Uuid) -> Result<AcceptedResult, CommitFailure> {
        let record = normalize(payload, id, Utc::now());

        let counted_groups = self
            .commit(&record)
            .await
            .map_err(|source| CommitFailure { id, source })?;

        Ok(AcceptedResult { id, counted_groups })
    }

    async fn commit(&self, record: &SubmissionRecord) -> scinet_common::Result<Vec<String>> {
        let mut tx = self.db.begin().await?;

        // Insert first so the transaction takes the write lock on its first
        // statement and waits on busy_timeout instead of failing to upgrade.
        submissions::insert_submission(&mut tx, record).await?;

        let mut counted = Vec::with_capacity(record.groups.len());
        for group_id in &record.groups {
            if groups::increment_submissions(&mut tx, group_id).await? {
                counted.push(group_id.clone());
            } else {
                debug!(id = %record.id, group = %group_id, "Skipping unknown group reference");
            }
        }

        tx.commit().await?;
        Ok(counted)
    }
}

/// Build the structured record for a payload
///
/// Reads `hash`, `title`, `authors`, `doi` (falling back to `url`), `groups`
/// and `group`. Anything else is kept only inside the stored payload. Fields
/// of the wrong JSON type are treated as absent.
pub fn normalize(payload: Value, id: Uuid, received_at: DateTime<Utc>) -> SubmissionRecord {
    let fingerprint = payload
        .get("hash")
        .and_then(Value::as_str)
        .filter(|h| !h.is_empty())
        .map(str::to_string);

    let title = payload
        .get("title")
        .and_then(Value::as_str)
        .map(collapse_whitespace)
        .filter(|t| !t.is_empty());

    let authors = read_authors(&payload);

    let doi = ["doi", "url"]
        .iter()
        .filter_map(|key| payload.get(*key).and_then(Value::as_str))
        .find_map(extract_doi)
        .map(str::to_string);

    let groups = read_group_refs(&payload);

    SubmissionRecord {
        id,
        fingerprint,
        title,
        authors,
        doi,
        groups,
        payload,
        received_at,
    }
}

/// `authors` as a list of names (strings or `{"name": ...}` objects) or a
/// single string
fn read_authors(payload: &Value) -> Vec<String> {
    let names: Vec<&str> = match payload.get("authors") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name.as_str()),
                Value::Object(obj) => obj.get("name").and_then(Value::as_str),
                _ => None,
            })
            .collect(),
        Some(Value::String(name)) => vec![name.as_str()],
        _ => Vec::new(),
    };

    names
        .into_iter()
        .map(dotify)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Group ids from `groups` (strings or `{"_id"|"id": ...}` objects) and
/// `group`, deduplicated in first-seen order
fn read_group_refs(payload: &Value) -> Vec<String> {
    let mut refs: Vec<&str> = Vec::new();

    if let Some(Value::Array(items)) = payload.get("groups") {
        refs.extend(items.iter().filter_map(|item| match item {
            Value::String(id) => Some(id.as_str()),
            Value::Object(obj) => obj
                .get("_id")
                .or_else(|| obj.get("id"))
                .and_then(Value::as_str),
            _ => None,
        }));
    }

    if let Some(id) = payload.get("group").and_then(Value::as_str) {
        refs.push(id);
    }

    let mut groups: Vec<String> = Vec::with_capacity(refs.len());
    for id in refs.into_iter().map(str::trim).filter(|id| !id.is_empty()) {
        if !groups.iter().any(|seen| seen == id) {
            groups.push(id.to_string());
        }
    }
    groups
}
