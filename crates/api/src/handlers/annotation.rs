//! Handlers for health annotations on encounters and procedures.
//!
//! Provides the palette configuration read, the per-patient annotation
//! history, single annotation lookup, and the save endpoint that stores the
//! drawing together with its rendered image.

use annotation_core::annotation::{
    require_file_data, ANNOTATION_ENTITY, DEFAULT_ANNOTATION_TYPE, IMAGE_FIELD,
};
use annotation_core::data_url::{decode_image_data_url, DecodedImage};
use annotation_core::error::CoreError;
use annotation_core::hashing::sha256_hex;
use annotation_core::records::ClinicalRecordKind;
use annotation_core::storage::{new_storage_key, private_file_url, FileStore};
use annotation_core::types::DbId;
use annotation_db::models::annotation_treatment::AnnotationConfig;
use annotation_db::models::clinical_record::CreateAnnotationLink;
use annotation_db::models::file::{CreateStoredFile, StoredFile};
use annotation_db::models::health_annotation::{
    CreateHealthAnnotation, HealthAnnotation, UpdateHealthAnnotation,
};
use annotation_db::repositories::{
    AnnotationTemplateRepo, AnnotationTreatmentRepo, ClinicalRecordRepo, FileRepo,
    HealthAnnotationRepo,
};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/* --------------------------------------------------------------------------
   Request / response types
   -------------------------------------------------------------------------- */

/// Query parameters for the history endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Record kind: `encounter` / `procedure` (or the legacy labels).
    pub doctype: String,
    /// Record id.
    pub docname: DbId,
}

/// Body of `POST /annotations`.
#[derive(Debug, Deserialize, Validate)]
pub struct SaveAnnotationRequest {
    pub docname: DbId,
    pub doctype: String,
    pub annotation_template: DbId,
    /// Existing annotation to update instead of creating a new one.
    #[serde(default)]
    pub annotation_name: Option<DbId>,
    /// Free-text label stored on the link row.
    #[serde(default)]
    #[validate(length(max = 140))]
    pub encounter_type: String,
    /// `data:image/<subtype>;base64,<payload>`.
    #[serde(default)]
    pub file_data: Option<String>,
    /// Serialized drawing data, stored as-is.
    #[serde(default)]
    pub json_text: String,
    #[serde(default = "default_annotation_type")]
    #[validate(length(max = 140))]
    pub annotation_type: String,
}

fn default_annotation_type() -> String {
    DEFAULT_ANNOTATION_TYPE.to_string()
}

/// Result of a save: the annotation as persisted plus its image URL.
#[derive(Debug, Serialize)]
pub struct SavedAnnotation {
    pub annotation: HealthAnnotation,
    pub file_url: String,
}

/* --------------------------------------------------------------------------
   Handlers
   -------------------------------------------------------------------------- */

/// GET /annotations/records
///
/// All templates (creation order) and all treatments with their variables.
pub async fn annotations_records(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let templates = AnnotationTemplateRepo::list(&state.pool).await?;
    let treatments = AnnotationTreatmentRepo::list_with_variables(&state.pool).await?;
    Ok(Json(DataResponse {
        data: AnnotationConfig {
            templates,
            treatments,
        },
    }))
}

/// GET /annotations/history?doctype=&docname=
///
/// Every annotation attached to any encounter or procedure of the patient
/// that owns the given record, oldest first. One entry per link: an
/// annotation linked from several records appears once for each link.
pub async fn get_annotation_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<impl IntoResponse> {
    let kind = ClinicalRecordKind::parse(&params.doctype)?;

    let patient_id = ClinicalRecordRepo::find_patient_id(&state.pool, kind, params.docname)
        .await?
        .ok_or_else(|| CoreError::not_found(kind.entity_name(), params.docname))?;

    let mut annotation_ids = Vec::new();
    for parent_kind in ClinicalRecordKind::ALL {
        let records =
            ClinicalRecordRepo::list_for_patient(&state.pool, parent_kind, patient_id).await?;
        let parent_ids: Vec<DbId> = records.iter().map(|r| r.id).collect();
        let links = ClinicalRecordRepo::list_links(&state.pool, parent_kind, &parent_ids).await?;
        annotation_ids.extend(links.into_iter().map(|link| link.annotation_id));
    }

    let history = HealthAnnotationRepo::list_history(&state.pool, &annotation_ids).await?;

    if history.len() < annotation_ids.len() {
        tracing::warn!(
            patient_id,
            unresolved = annotation_ids.len() - history.len(),
            "Annotation links reference missing annotations"
        );
    }

    Ok(Json(DataResponse { data: history }))
}

/// GET /annotations/{id}
pub async fn get_annotation(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let annotation = HealthAnnotationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found(ANNOTATION_ENTITY, id))?;
    Ok(Json(DataResponse { data: annotation }))
}

/// POST /annotations
///
/// Create (or update, when `annotation_name` resolves) an annotation, link
/// new annotations onto the target record, and store the image.
///
/// The payload is validated and decoded before anything is written. All
/// rows are written in one transaction; the image blob is written before
/// commit and removed again if the commit does not happen.
pub async fn save_annotation(
    State(state): State<AppState>,
    Json(input): Json<SaveAnnotationRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(CoreError::from)?;
    let file_data = require_file_data(input.file_data.as_deref())?;
    let image = decode_image_data_url(file_data)?;
    let kind = ClinicalRecordKind::parse(&input.doctype)?;

    if AnnotationTemplateRepo::find_by_id(&state.pool, input.annotation_template)
        .await?
        .is_none()
    {
        return Err(CoreError::not_found("AnnotationTemplate", input.annotation_template).into());
    }

    let existing = match input.annotation_name {
        Some(id) => HealthAnnotationRepo::find_by_id(&state.pool, id).await?,
        None => None,
    };

    let mut tx = state.pool.begin().await?;

    let (annotation, created) = match existing {
        Some(existing) => {
            let update = UpdateHealthAnnotation {
                annotation_template_id: Some(input.annotation_template),
                json: Some(input.json_text.clone()),
            };
            let annotation = HealthAnnotationRepo::update(&mut tx, existing.id, &update)
                .await?
                .ok_or_else(|| CoreError::not_found(ANNOTATION_ENTITY, existing.id))?;
            (annotation, false)
        }
        None => {
            let create = CreateHealthAnnotation {
                annotation_type: input.annotation_type.clone(),
                annotation_template_id: input.annotation_template,
                json: input.json_text.clone(),
            };
            let annotation = HealthAnnotationRepo::create(&mut tx, &create).await?;

            let link = CreateAnnotationLink {
                annotation_id: annotation.id,
                link_type: input.encounter_type.clone(),
            };
            ClinicalRecordRepo::append_link(&mut tx, kind, input.docname, &link)
                .await?
                .ok_or_else(|| CoreError::not_found(kind.entity_name(), input.docname))?;
            (annotation, true)
        }
    };

    let storage_key = new_storage_key(&image.extension);
    state.file_store.put(&storage_key, &image.bytes).await?;

    let (annotation, file) = match attach_image(tx, annotation.id, &storage_key, &image).await {
        Ok(saved) => saved,
        Err(err) => {
            discard_blob(state.file_store.as_ref(), &storage_key).await;
            return Err(err.into());
        }
    };

    tracing::info!(
        annotation_id = annotation.id,
        parent_kind = %kind,
        parent_id = input.docname,
        file_url = %file.file_url,
        created,
        "Health annotation saved"
    );

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(DataResponse {
            data: SavedAnnotation {
                annotation,
                file_url: file.file_url,
            },
        }),
    ))
}

/* --------------------------------------------------------------------------
   Helpers
   -------------------------------------------------------------------------- */

/// Record the stored blob, point the annotation at it, and commit.
async fn attach_image(
    mut tx: sqlx::Transaction<'_, sqlx::Postgres>,
    annotation_id: DbId,
    storage_key: &str,
    image: &DecodedImage,
) -> Result<(HealthAnnotation, StoredFile), sqlx::Error> {
    let file = FileRepo::create(
        &mut tx,
        &CreateStoredFile {
            file_name: image.file_name.clone(),
            file_url: private_file_url(storage_key),
            storage_key: storage_key.to_string(),
            attached_to_kind: ANNOTATION_ENTITY.to_string(),
            attached_to_id: annotation_id,
            attached_to_field: Some(IMAGE_FIELD.to_string()),
            is_private: true,
            file_size: image.bytes.len() as i64,
            content_hash: sha256_hex(&image.bytes),
        },
    )
    .await?;

    let annotation = HealthAnnotationRepo::set_image(&mut tx, annotation_id, &file.file_url).await?;
    tx.commit().await?;
    Ok((annotation, file))
}

/// Best-effort removal of a blob whose rows were never committed.
async fn discard_blob(store: &dyn FileStore, storage_key: &str) {
    if let Err(e) = store.delete(storage_key).await {
        tracing::warn!(storage_key, error = %e, "Failed to remove orphaned annotation image");
    }
}

