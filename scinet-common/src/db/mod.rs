//! Database schema, models and queries

pub mod groups;
pub mod init;
pub mod models;
pub mod submissions;

pub use init::*;
pub use models::*;
