//! # SciNet Common Library
//!
//! Shared code for the SciNet ingestion services including:
//! - Database schema, initialization and queries
//! - Submission and group models
//! - Configuration loading
//! - Identifier generation
//! - Bibliographic text helpers (name normalization, DOI extraction)

pub mod config;
pub mod db;
pub mod error;
pub mod text;
pub mod uuid_utils;

pub use error::{Error, Result};
