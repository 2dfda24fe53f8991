//! Domain building blocks for the clinical annotation service.
//!
//! Everything here is independent of HTTP and SQL: shared id/timestamp
//! aliases, the [`error::CoreError`] type, data URL parsing, clinical record
//! kinds and the private file store.

pub mod annotation;
pub mod data_url;
pub mod error;
pub mod hashing;
pub mod records;
pub mod storage;
pub mod types;
