//! Stored file model and DTO.

use annotation_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `files` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StoredFile {
    pub id: DbId,
    /// Logical name, e.g. `annotation.png`.
    pub file_name: String,
    pub file_url: String,
    /// Key of the blob in the file store.
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub attached_to_kind: String,
    pub attached_to_id: DbId,
    pub attached_to_field: Option<String>,
    pub is_private: bool,
    pub file_size: i64,
    pub content_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a stored file.
#[derive(Debug, Clone)]
pub struct CreateStoredFile {
    pub file_name: String,
    pub file_url: String,
    pub storage_key: String,
    pub attached_to_kind: String,
    pub attached_to_id: DbId,
    pub attached_to_field: Option<String>,
    pub is_private: bool,
    pub file_size: i64,
    pub content_hash: String,
}
