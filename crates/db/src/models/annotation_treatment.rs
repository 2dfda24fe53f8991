//! Annotation treatment model and its variable rows (read-only reference data).

use annotation_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::annotation_template::AnnotationTemplate;

/// A row from the `annotation_treatments` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AnnotationTreatment {
    pub id: DbId,
    pub treatment: String,
    pub color: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `treatment_variables` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TreatmentVariable {
    pub id: DbId,
    pub treatment_id: DbId,
    pub idx: i32,
    pub variable_name: String,
    #[serde(rename = "type")]
    pub variable_type: String,
    pub options: Option<String>,
}

/// A treatment enriched with its ordered variables.
#[derive(Debug, Clone, Serialize)]
pub struct TreatmentWithVariables {
    #[serde(flatten)]
    pub treatment: AnnotationTreatment,
    pub variables: Vec<TreatmentVariable>,
}

/// Everything the drawing client needs to set up its palette.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationConfig {
    pub templates: Vec<AnnotationTemplate>,
    pub treatments: Vec<TreatmentWithVariables>,
}
