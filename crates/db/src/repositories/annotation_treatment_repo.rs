//! Repository for the `annotation_treatments` and `treatment_variables` tables.

use annotation_core::types::DbId;
use sqlx::PgPool;

use crate::models::annotation_treatment::{
    AnnotationTreatment, TreatmentVariable, TreatmentWithVariables,
};

/// Column list for the `annotation_treatments` table.
const COLUMNS: &str = "id, treatment, color, created_at, updated_at";

/// Column list for the `treatment_variables` table.
const VARIABLE_COLUMNS: &str = "id, treatment_id, idx, variable_name, variable_type, options";

/// Read access to treatments and their variables.
pub struct AnnotationTreatmentRepo;

impl AnnotationTreatmentRepo {
    /// List all treatments.
    pub async fn list(pool: &PgPool) -> Result<Vec<AnnotationTreatment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM annotation_treatments ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, AnnotationTreatment>(&query)
            .fetch_all(pool)
            .await
    }

    /// List the variables of one treatment in row order.
    pub async fn list_variables(
        pool: &PgPool,
        treatment_id: DbId,
    ) -> Result<Vec<TreatmentVariable>, sqlx::Error> {
        let query = format!(
            "SELECT {VARIABLE_COLUMNS} FROM treatment_variables \
             WHERE treatment_id = $1 \
             ORDER BY idx ASC, id ASC"
        );
        sqlx::query_as::<_, TreatmentVariable>(&query)
            .bind(treatment_id)
            .fetch_all(pool)
            .await
    }

    /// List all treatments, each with its variables.
    pub async fn list_with_variables(
        pool: &PgPool,
    ) -> Result<Vec<TreatmentWithVariables>, sqlx::Error> {
        let treatments = Self::list(pool).await?;
        let mut result = Vec::with_capacity(treatments.len());

        for treatment in treatments {
            let variables = Self::list_variables(pool, treatment.id).await?;
            result.push(TreatmentWithVariables {
                treatment,
                variables,
            });
        }

        Ok(result)
    }
}
