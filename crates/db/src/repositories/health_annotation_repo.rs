//! Repository for the `health_annotations` table.

use annotation_core::types::DbId;
use sqlx::PgPool;

use crate::models::health_annotation::{
    AnnotationHistoryEntry, CreateHealthAnnotation, HealthAnnotation, UpdateHealthAnnotation,
};

/// Column list for health_annotations queries.
const COLUMNS: &str = "id, annotation_type, annotation_template_id, image, json, \
    created_at, updated_at";

/// Columns projected by the history reader, qualified for JOIN queries.
const HISTORY_COLUMNS_QUALIFIED: &str =
    "a.id, a.annotation_template_id, a.image, a.json, a.created_at";

/// Provides CRUD operations for health annotations.
pub struct HealthAnnotationRepo;

impl HealthAnnotationRepo {
    /// Insert a new annotation inside the caller's transaction.
    pub async fn create(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateHealthAnnotation,
    ) -> Result<HealthAnnotation, sqlx::Error> {
        let query = format!(
            "INSERT INTO health_annotations (annotation_type, annotation_template_id, json) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HealthAnnotation>(&query)
            .bind(&input.annotation_type)
            .bind(input.annotation_template_id)
            .bind(&input.json)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find an annotation by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<HealthAnnotation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM health_annotations WHERE id = $1");
        sqlx::query_as::<_, HealthAnnotation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update template and/or drawing data inside the caller's transaction.
    ///
    /// Returns `None` if the annotation does not exist.
    pub async fn update(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        input: &UpdateHealthAnnotation,
    ) -> Result<Option<HealthAnnotation>, sqlx::Error> {
        let query = format!(
            "UPDATE health_annotations SET \
                annotation_template_id = COALESCE($1, annotation_template_id), \
                json = COALESCE($2, json) \
             WHERE id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HealthAnnotation>(&query)
            .bind(input.annotation_template_id)
            .bind(&input.json)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Point an annotation at its stored image.
    pub async fn set_image(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        file_url: &str,
    ) -> Result<HealthAnnotation, sqlx::Error> {
        let query = format!(
            "UPDATE health_annotations SET image = $1 WHERE id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HealthAnnotation>(&query)
            .bind(file_url)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Load the history projection for a list of annotation IDs, oldest first.
    ///
    /// Yields one row per element of `ids`: repeated IDs repeat the row and
    /// IDs that do not resolve produce no row.
    pub async fn list_history(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<AnnotationHistoryEntry>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {HISTORY_COLUMNS_QUALIFIED} FROM health_annotations a \
             JOIN UNNEST($1::BIGINT[]) AS wanted(id) ON wanted.id = a.id \
             ORDER BY a.created_at ASC, a.id ASC"
        );
        sqlx::query_as::<_, AnnotationHistoryEntry>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}
