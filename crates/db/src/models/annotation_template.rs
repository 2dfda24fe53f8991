//! Annotation template model (read-only reference data).

use annotation_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `annotation_templates` table.
///
/// A template is a body diagram the clinician draws on; `gender` and `kid`
/// let the client pick the right diagram for the patient.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AnnotationTemplate {
    pub id: DbId,
    pub label: String,
    pub gender: Option<String>,
    pub kid: bool,
    pub image: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
