//! Clinical record kinds that can own annotation links.
//!
//! Encounters and procedures live in separate tables but share the same
//! shape (`id`, `patient_id`) and the same link child table. The kind is the
//! typed replacement for addressing a record by a free-form doctype string.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A kind of clinical record that annotations can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClinicalRecordKind {
    Encounter,
    Procedure,
}

/// Accepted spellings, listed in error messages.
const VALID_KIND_STRINGS: &[&str] = &[
    "encounter",
    "procedure",
    "Patient Encounter",
    "Clinical Procedure",
];

impl ClinicalRecordKind {
    /// Every kind, in the order the history reader walks them.
    pub const ALL: [ClinicalRecordKind; 2] = [Self::Encounter, Self::Procedure];

    /// Stored in `health_annotation_links.parent_kind`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Encounter => "encounter",
            Self::Procedure => "procedure",
        }
    }

    /// Table holding records of this kind.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Encounter => "patient_encounters",
            Self::Procedure => "clinical_procedures",
        }
    }

    /// Entity name used in not-found errors.
    pub fn entity_name(&self) -> &'static str {
        match self {
            Self::Encounter => "PatientEncounter",
            Self::Procedure => "ClinicalProcedure",
        }
    }

    /// Parse a kind from its wire name or its legacy document label.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "encounter" | "Patient Encounter" => Ok(Self::Encounter),
            "procedure" | "Clinical Procedure" => Ok(Self::Procedure),
            _ => Err(CoreError::Validation(format!(
                "Invalid clinical record type '{s}'. Must be one of: {}",
                VALID_KIND_STRINGS.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for ClinicalRecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
