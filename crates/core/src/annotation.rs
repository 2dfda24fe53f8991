//! Health annotation constants and validation.
//!
//! Provides defaults and input checks shared by the annotation writer and
//! its tests.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Annotation type used when the caller does not supply one.
pub const DEFAULT_ANNOTATION_TYPE: &str = "Free Drawing";

/// Field designation a stored annotation image is attached under.
pub const IMAGE_FIELD: &str = "image";

/// Entity name used for annotation rows in errors and file attachments.
pub const ANNOTATION_ENTITY: &str = "HealthAnnotation";

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Require a non-empty image payload and return it.
pub fn require_file_data(file_data: Option<&str>) -> Result<&str, CoreError> {
    match file_data {
        Some(data) if !data.trim().is_empty() => Ok(data),
        _ => Err(CoreError::Validation("File data is missing".to_string())),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
