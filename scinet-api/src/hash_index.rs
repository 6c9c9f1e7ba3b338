//! Fingerprint existence queries backing the pre-check
//!
//! The index is the `hash` column of committed submission records, so a
//! fingerprint becomes visible once the commit that carried it completes.

use sqlx::SqlitePool;
use thiserror::Error;

use scinet_common::db::submissions;

/// Pre-check failure
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Fingerprint must be a non-empty string")]
    EmptyFingerprint,

    /// Storage failure; never to be read as "absent"
    #[error("Hash index lookup failed: {0}")]
    Unavailable(#[source] scinet_common::Error),
}

/// Outcome of a pre-check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precheck {
    /// Already accepted; the client should not resubmit
    Known,
    /// Not seen; the client should submit the full payload
    Unknown,
}

#[derive(Clone)]
pub struct HashIndex {
    db: SqlitePool,
}

impl HashIndex {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// True iff an accepted submission recorded exactly this fingerprint
    pub async fn exists(&self, fingerprint: &str) -> Result<bool, LookupError> {
        if fingerprint.is_empty() {
            return Err(LookupError::EmptyFingerprint);
        }

        submissions::hash_exists(&self.db, fingerprint)
            .await
            .map_err(LookupError::Unavailable)
    }

    pub async fn precheck(&self, fingerprint: &str) -> Result<Precheck, LookupError> {
        Ok(if self.exists(fingerprint).await? {
            Precheck::Known
        } else {
            Precheck::Unknown
        })
    }
}
