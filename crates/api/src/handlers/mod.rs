//! Request handlers.
//!
//! Handlers delegate to the repositories in `annotation_db` and map errors
//! via [`AppError`](crate::error::AppError).

pub mod annotation;
pub mod files;
