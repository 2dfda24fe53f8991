//! Health annotation model and DTOs.

use annotation_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `health_annotations` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HealthAnnotation {
    pub id: DbId,
    pub annotation_type: String,
    pub annotation_template_id: Option<DbId>,
    /// File URL of the rendered image, set once the image is stored.
    pub image: Option<String>,
    /// Serialized drawing data as sent by the client.
    pub json: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Projection returned by the history reader.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AnnotationHistoryEntry {
    pub id: DbId,
    pub annotation_template_id: Option<DbId>,
    pub image: Option<String>,
    pub json: String,
    pub created_at: Timestamp,
}

/// DTO for creating a new health annotation.
#[derive(Debug, Clone)]
pub struct CreateHealthAnnotation {
    pub annotation_type: String,
    pub annotation_template_id: DbId,
    pub json: String,
}

/// DTO for updating an existing health annotation. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateHealthAnnotation {
    pub annotation_template_id: Option<DbId>,
    pub json: Option<String>,
}
