//! Repository for clinical records and their `health_annotation_links` rows.
//!
//! Encounters and procedures are stored in separate tables with the same
//! shape; every method takes a [`ClinicalRecordKind`] selecting the table.

use annotation_core::records::ClinicalRecordKind;
use annotation_core::types::DbId;
use sqlx::PgPool;

use crate::models::clinical_record::{AnnotationLink, ClinicalRecord, CreateAnnotationLink};

/// Column list for the encounter / procedure tables.
const COLUMNS: &str = "id, patient_id, created_at, updated_at";

/// Column list for the `health_annotation_links` table.
const LINK_COLUMNS: &str =
    "id, parent_kind, parent_id, idx, annotation_id, link_type, created_at, updated_at";

/// Same as [`LINK_COLUMNS`], qualified for JOIN queries.
const LINK_COLUMNS_QUALIFIED: &str = "l.id, l.parent_kind, l.parent_id, l.idx, \
    l.annotation_id, l.link_type, l.created_at, l.updated_at";

/// Provides lookups on clinical records and link appends.
pub struct ClinicalRecordRepo;

impl ClinicalRecordRepo {
    /// Find a clinical record by kind and ID.
    pub async fn find_by_id(
        pool: &PgPool,
        kind: ClinicalRecordKind,
        id: DbId,
    ) -> Result<Option<ClinicalRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {} WHERE id = $1", kind.table());
        sqlx::query_as::<_, ClinicalRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Return the patient a record belongs to, or `None` if the record is gone.
    pub async fn find_patient_id(
        pool: &PgPool,
        kind: ClinicalRecordKind,
        id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let query = format!("SELECT patient_id FROM {} WHERE id = $1", kind.table());
        let row: Option<(DbId,)> = sqlx::query_as(&query).bind(id).fetch_optional(pool).await?;
        Ok(row.map(|(patient_id,)| patient_id))
    }

    /// List every record of `kind` belonging to a patient.
    pub async fn list_for_patient(
        pool: &PgPool,
        kind: ClinicalRecordKind,
        patient_id: DbId,
    ) -> Result<Vec<ClinicalRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE patient_id = $1 ORDER BY created_at ASC, id ASC",
            kind.table()
        );
        sqlx::query_as::<_, ClinicalRecord>(&query)
            .bind(patient_id)
            .fetch_all(pool)
            .await
    }

    /// List the annotation links attached to the given records.
    ///
    /// Links are joined against the parent table, so links whose parent row
    /// no longer exists are dropped.
    pub async fn list_links(
        pool: &PgPool,
        kind: ClinicalRecordKind,
        parent_ids: &[DbId],
    ) -> Result<Vec<AnnotationLink>, sqlx::Error> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {LINK_COLUMNS_QUALIFIED} FROM health_annotation_links l \
             JOIN {} p ON p.id = l.parent_id \
             WHERE l.parent_kind = $1 AND l.parent_id = ANY($2) \
             ORDER BY l.parent_id ASC, l.idx ASC",
            kind.table()
        );
        sqlx::query_as::<_, AnnotationLink>(&query)
            .bind(kind.as_str())
            .bind(parent_ids)
            .fetch_all(pool)
            .await
    }

    /// Append a link onto a clinical record inside the caller's transaction.
    ///
    /// The parent row is locked for the rest of the transaction so concurrent
    /// appends get consecutive `idx` values, and its `updated_at` is bumped.
    /// Returns `None` if the parent record does not exist.
    pub async fn append_link(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        kind: ClinicalRecordKind,
        parent_id: DbId,
        input: &CreateAnnotationLink,
    ) -> Result<Option<AnnotationLink>, sqlx::Error> {
        let lock_query = format!(
            "UPDATE {} SET updated_at = NOW() WHERE id = $1 RETURNING id",
            kind.table()
        );
        let locked: Option<(DbId,)> = sqlx::query_as(&lock_query)
            .bind(parent_id)
            .fetch_optional(&mut **tx)
            .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let insert_query = format!(
            "INSERT INTO health_annotation_links \
                (parent_kind, parent_id, idx, annotation_id, link_type) \
             VALUES ($1, $2, \
                (SELECT COALESCE(MAX(idx), 0) + 1 FROM health_annotation_links \
                 WHERE parent_kind = $1 AND parent_id = $2), \
                $3, $4) \
             RETURNING {LINK_COLUMNS}"
        );
        let link = sqlx::query_as::<_, AnnotationLink>(&insert_query)
            .bind(kind.as_str())
            .bind(parent_id)
            .bind(input.annotation_id)
            .bind(&input.link_type)
            .fetch_one(&mut **tx)
            .await?;

        tracing::debug!(
            parent_kind = %kind,
            parent_id,
            idx = link.idx,
            annotation_id = link.annotation_id,
            "Annotation link appended"
        );

        Ok(Some(link))
    }
}
