//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (reads) or an open transaction (writes) as the first
//! argument.

pub mod annotation_template_repo;
pub mod annotation_treatment_repo;
pub mod clinical_record_repo;
pub mod file_repo;
pub mod health_annotation_repo;

pub use annotation_template_repo::AnnotationTemplateRepo;
pub use annotation_treatment_repo::AnnotationTreatmentRepo;
pub use clinical_record_repo::ClinicalRecordRepo;
pub use file_repo::FileRepo;
pub use health_annotation_repo::HealthAnnotationRepo;
