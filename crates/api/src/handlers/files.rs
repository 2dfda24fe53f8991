//! Serving stored private files back to clients.

use annotation_core::data_url::{content_type_for, is_inline_image};
use annotation_core::error::CoreError;
use annotation_core::storage::{private_file_url, validate_storage_key};
use annotation_db::repositories::FileRepo;
use axum::extract::{Path, State};
use axum::http::header::{
    CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS,
};
use axum::response::IntoResponse;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /private/files/{file_name}
///
/// Stream the bytes of a stored file. The file must be recorded in the
/// `files` table; blobs without a row are not served. Only raster images are
/// served `inline`; everything else is forced to download.
pub async fn download_private_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> AppResult<impl IntoResponse> {
    validate_storage_key(&file_name)?;

    let file_url = private_file_url(&file_name);
    let file = FileRepo::find_by_url(&state.pool, &file_url)
        .await?
        .ok_or_else(|| CoreError::not_found("File", &file_name))?;

    let bytes = state.file_store.get(&file.storage_key).await?;

    let disposition = if is_inline_image(&file.file_name) {
        "inline"
    } else {
        "attachment"
    };

    Ok((
        [
            (CONTENT_TYPE, content_type_for(&file.file_name)),
            (
                CONTENT_DISPOSITION,
                format!("{disposition}; filename=\"{}\"", file.file_name),
            ),
            (X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
            (CACHE_CONTROL, "private, no-store".to_string()),
        ],
        bytes,
    ))
}
