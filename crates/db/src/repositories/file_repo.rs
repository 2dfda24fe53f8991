//! Repository for the `files` table.

use sqlx::PgPool;

use crate::models::file::{CreateStoredFile, StoredFile};

/// Column list for files queries.
const COLUMNS: &str = "id, file_name, file_url, storage_key, attached_to_kind, \
    attached_to_id, attached_to_field, is_private, file_size, content_hash, \
    created_at, updated_at";

/// Records and looks up stored files.
pub struct FileRepo;

impl FileRepo {
    /// Record a stored file inside the caller's transaction.
    pub async fn create(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateStoredFile,
    ) -> Result<StoredFile, sqlx::Error> {
        let query = format!(
            "INSERT INTO files \
                (file_name, file_url, storage_key, attached_to_kind, attached_to_id, \
                 attached_to_field, is_private, file_size, content_hash) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoredFile>(&query)
            .bind(&input.file_name)
            .bind(&input.file_url)
            .bind(&input.storage_key)
            .bind(&input.attached_to_kind)
            .bind(input.attached_to_id)
            .bind(&input.attached_to_field)
            .bind(input.is_private)
            .bind(input.file_size)
            .bind(&input.content_hash)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a stored file by its URL.
    pub async fn find_by_url(
        pool: &PgPool,
        file_url: &str,
    ) -> Result<Option<StoredFile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM files WHERE file_url = $1");
        sqlx::query_as::<_, StoredFile>(&query)
            .bind(file_url)
            .fetch_optional(pool)
            .await
    }
}
