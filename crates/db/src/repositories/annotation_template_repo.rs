//! Repository for the `annotation_templates` table.

use annotation_core::types::DbId;
use sqlx::PgPool;

use crate::models::annotation_template::AnnotationTemplate;

/// Column list for annotation_templates queries.
const COLUMNS: &str = "id, label, gender, kid, image, created_at, updated_at";

/// Read access to annotation templates.
pub struct AnnotationTemplateRepo;

impl AnnotationTemplateRepo {
    /// List all templates in creation order.
    pub async fn list(pool: &PgPool) -> Result<Vec<AnnotationTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM annotation_templates ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, AnnotationTemplate>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find a template by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AnnotationTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM annotation_templates WHERE id = $1");
        sqlx::query_as::<_, AnnotationTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
