//! Clinical record (encounter / procedure) and annotation link models.

use annotation_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `patient_encounters` or `clinical_procedures`.
///
/// Both tables share this shape; which one a value came from is tracked by
/// the caller's `ClinicalRecordKind`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ClinicalRecord {
    pub id: DbId,
    pub patient_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `health_annotation_links` child table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AnnotationLink {
    pub id: DbId,
    pub parent_kind: String,
    pub parent_id: DbId,
    /// 1-based position within the parent's link list.
    pub idx: i32,
    pub annotation_id: DbId,
    pub link_type: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for appending a link onto a clinical record.
#[derive(Debug, Clone)]
pub struct CreateAnnotationLink {
    pub annotation_id: DbId,
    pub link_type: String,
}
