use std::sync::Arc;

use annotation_core::storage::FileStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: annotation_db::DbPool,
    /// Blob store holding private files (annotation images).
    pub file_store: Arc<dyn FileStore>,
}
