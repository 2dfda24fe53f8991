//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - Plain input DTOs for the writes this service performs

pub mod annotation_template;
pub mod annotation_treatment;
pub mod clinical_record;
pub mod file;
pub mod health_annotation;
