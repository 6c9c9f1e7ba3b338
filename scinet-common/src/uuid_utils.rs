//! Submission identifier generation
//!
//! Identifiers are random UUIDv4 values (122 random bits). Generation needs no
//! central sequence or lock, so any number of request handlers may call
//! [`generate`] concurrently.

use uuid::Uuid;

/// Generate a new submission identifier
pub fn generate() -> Uuid {
    Uuid::new_v4()
}
