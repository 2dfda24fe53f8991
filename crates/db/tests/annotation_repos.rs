//! Integration tests for the annotation repositories.
//!
//! Exercises the repository layer against a real database:
//! - Palette reads (templates, treatments with ordered variables)
//! - Link appends with per-parent positions and missing parents
//! - Annotation create / update / set_image inside transactions
//! - History projection ordering and missing IDs

use annotation_core::records::ClinicalRecordKind;
use annotation_db::models::clinical_record::CreateAnnotationLink;
use annotation_db::models::file::CreateStoredFile;
use annotation_db::models::health_annotation::{CreateHealthAnnotation, UpdateHealthAnnotation};
use annotation_db::repositories::{
    AnnotationTemplateRepo, AnnotationTreatmentRepo, ClinicalRecordRepo, FileRepo,
    HealthAnnotationRepo,
};
use assert_matches::assert_matches;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn insert_template(pool: &PgPool, label: &str) -> i64 {
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO annotation_templates (label) VALUES ($1) RETURNING id")
            .bind(label)
            .fetch_one(pool)
            .await
            .unwrap();
    id
}

async fn insert_patient(pool: &PgPool) -> i64 {
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO patients (full_name) VALUES ('Jane Roe') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
    id
}

async fn insert_record(pool: &PgPool, kind: ClinicalRecordKind, patient_id: i64) -> i64 {
    let (id,): (i64,) = sqlx::query_as(&format!(
        "INSERT INTO {} (patient_id) VALUES ($1) RETURNING id",
        kind.table()
    ))
    .bind(patient_id)
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

fn new_annotation(template_id: i64, json: &str) -> CreateHealthAnnotation {
    CreateHealthAnnotation {
        annotation_type: "Free Drawing".to_string(),
        annotation_template_id: template_id,
        json: json.to_string(),
    }
}

fn new_link(annotation_id: i64, link_type: &str) -> CreateAnnotationLink {
    CreateAnnotationLink {
        annotation_id,
        link_type: link_type.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn templates_listed_in_creation_order(pool: PgPool) {
    let first = insert_template(&pool, "Full body").await;
    let second = insert_template(&pool, "Head").await;

    let templates = AnnotationTemplateRepo::list(&pool).await.unwrap();
    let ids: Vec<i64> = templates.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![first, second]);
    assert!(!templates[0].kid);

    assert!(AnnotationTemplateRepo::find_by_id(&pool, second)
        .await
        .unwrap()
        .is_some());
    assert!(AnnotationTemplateRepo::find_by_id(&pool, 999_999)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn treatments_carry_ordered_variables(pool: PgPool) {
    let (treatment_id,): (i64,) = sqlx::query_as(
        "INSERT INTO annotation_treatments (treatment, color) VALUES ('Botox', '#ff0000') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO treatment_variables (treatment_id, idx, variable_name, variable_type, options)
         VALUES ($1, 2, 'Units', 'Int', NULL), ($1, 1, 'Area', 'Select', 'Forehead\nGlabella')",
    )
    .bind(treatment_id)
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO annotation_treatments (treatment) VALUES ('Filler')")
        .execute(&pool)
        .await
        .unwrap();

    let treatments = AnnotationTreatmentRepo::list_with_variables(&pool)
        .await
        .unwrap();
    assert_eq!(treatments.len(), 2);

    let botox = &treatments[0];
    assert_eq!(botox.treatment.treatment, "Botox");
    let names: Vec<&str> = botox
        .variables
        .iter()
        .map(|v| v.variable_name.as_str())
        .collect();
    assert_eq!(names, vec!["Area", "Units"]);

    assert!(treatments[1].variables.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_treatment_violates_unique_constraint(pool: PgPool) {
    sqlx::query("INSERT INTO annotation_treatments (treatment) VALUES ('Laser')")
        .execute(&pool)
        .await
        .unwrap();
    let err = sqlx::query("INSERT INTO annotation_treatments (treatment) VALUES ('Laser')")
        .execute(&pool)
        .await
        .unwrap_err();

    assert_matches!(err, sqlx::Error::Database(ref db)
        if db.constraint() == Some("uq_annotation_treatments_treatment"));
}

// ---------------------------------------------------------------------------
// Clinical records and links
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn record_lookup_by_kind(pool: PgPool) {
    let patient = insert_patient(&pool).await;
    let encounter = insert_record(&pool, ClinicalRecordKind::Encounter, patient).await;

    let record = ClinicalRecordRepo::find_by_id(&pool, ClinicalRecordKind::Encounter, encounter)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.patient_id, patient);

    assert_eq!(
        ClinicalRecordRepo::find_patient_id(&pool, ClinicalRecordKind::Encounter, encounter)
            .await
            .unwrap(),
        Some(patient)
    );
    // Same id in the other table does not exist.
    assert!(
        ClinicalRecordRepo::find_by_id(&pool, ClinicalRecordKind::Procedure, encounter)
            .await
            .unwrap()
            .is_none()
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn append_link_numbers_positions_per_parent(pool: PgPool) {
    let template = insert_template(&pool, "Face").await;
    let patient = insert_patient(&pool).await;
    let first_encounter = insert_record(&pool, ClinicalRecordKind::Encounter, patient).await;
    let second_encounter = insert_record(&pool, ClinicalRecordKind::Encounter, patient).await;

    let mut tx = pool.begin().await.unwrap();
    let a = HealthAnnotationRepo::create(&mut tx, &new_annotation(template, ""))
        .await
        .unwrap();
    let b = HealthAnnotationRepo::create(&mut tx, &new_annotation(template, ""))
        .await
        .unwrap();
    let c = HealthAnnotationRepo::create(&mut tx, &new_annotation(template, ""))
        .await
        .unwrap();

    let kind = ClinicalRecordKind::Encounter;
    let l1 = ClinicalRecordRepo::append_link(&mut tx, kind, first_encounter, &new_link(a.id, "Consult"))
        .await
        .unwrap()
        .unwrap();
    let l2 = ClinicalRecordRepo::append_link(&mut tx, kind, first_encounter, &new_link(b.id, ""))
        .await
        .unwrap()
        .unwrap();
    let l3 = ClinicalRecordRepo::append_link(&mut tx, kind, second_encounter, &new_link(c.id, ""))
        .await
        .unwrap()
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!((l1.idx, l2.idx, l3.idx), (1, 2, 1));
    assert_eq!(l1.parent_kind, "encounter");
    assert_eq!(l1.link_type, "Consult");

    let links = ClinicalRecordRepo::list_links(&pool, kind, &[first_encounter, second_encounter])
        .await
        .unwrap();
    let annotation_ids: Vec<i64> = links.iter().map(|l| l.annotation_id).collect();
    assert_eq!(annotation_ids, vec![a.id, b.id, c.id]);

    // Links are scoped by kind.
    let procedure_links =
        ClinicalRecordRepo::list_links(&pool, ClinicalRecordKind::Procedure, &[first_encounter])
            .await
            .unwrap();
    assert!(procedure_links.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn append_link_to_missing_parent_returns_none(pool: PgPool) {
    let template = insert_template(&pool, "Hand").await;

    let mut tx = pool.begin().await.unwrap();
    let annotation = HealthAnnotationRepo::create(&mut tx, &new_annotation(template, ""))
        .await
        .unwrap();
    let link = ClinicalRecordRepo::append_link(
        &mut tx,
        ClinicalRecordKind::Procedure,
        999_999,
        &new_link(annotation.id, ""),
    )
    .await
    .unwrap();
    assert!(link.is_none());
    tx.rollback().await.unwrap();

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM health_annotations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_links_with_no_parents_is_empty(pool: PgPool) {
    let links = ClinicalRecordRepo::list_links(&pool, ClinicalRecordKind::Encounter, &[])
        .await
        .unwrap();
    assert!(links.is_empty());
}

// ---------------------------------------------------------------------------
// Health annotations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_update_and_set_image(pool: PgPool) {
    let template = insert_template(&pool, "Torso").await;
    let other_template = insert_template(&pool, "Back").await;

    let mut tx = pool.begin().await.unwrap();
    let created = HealthAnnotationRepo::create(&mut tx, &new_annotation(template, "{\"v\":1}"))
        .await
        .unwrap();
    assert_eq!(created.annotation_type, "Free Drawing");
    assert_eq!(created.image, None);

    let updated = HealthAnnotationRepo::update(
        &mut tx,
        created.id,
        &UpdateHealthAnnotation {
            annotation_template_id: Some(other_template),
            json: None,
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.annotation_template_id, Some(other_template));
    assert_eq!(updated.json, "{\"v\":1}");

    let with_image =
        HealthAnnotationRepo::set_image(&mut tx, created.id, "/private/files/annotation-x.png")
            .await
            .unwrap();
    assert_eq!(with_image.image.as_deref(), Some("/private/files/annotation-x.png"));

    let missing = HealthAnnotationRepo::update(&mut tx, 999_999, &UpdateHealthAnnotation::default())
        .await
        .unwrap();
    assert!(missing.is_none());
    tx.commit().await.unwrap();

    let fetched = HealthAnnotationRepo::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.image.as_deref(), Some("/private/files/annotation-x.png"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn history_repeats_per_reference_and_skips_missing_ids(pool: PgPool) {
    let template = insert_template(&pool, "Leg").await;

    let newer: (i64,) = sqlx::query_as(
        "INSERT INTO health_annotations (annotation_template_id, json, created_at)
         VALUES ($1, 'newer', '2024-03-02T00:00:00Z') RETURNING id",
    )
    .bind(template)
    .fetch_one(&pool)
    .await
    .unwrap();
    let older: (i64,) = sqlx::query_as(
        "INSERT INTO health_annotations (annotation_template_id, json, created_at)
         VALUES ($1, 'older', '2024-03-01T00:00:00Z') RETURNING id",
    )
    .bind(template)
    .fetch_one(&pool)
    .await
    .unwrap();

    let history = HealthAnnotationRepo::list_history(&pool, &[newer.0, older.0, 999_999, newer.0])
        .await
        .unwrap();
    let jsons: Vec<&str> = history.iter().map(|h| h.json.as_str()).collect();
    assert_eq!(jsons, vec!["older", "newer", "newer"]);

    assert!(HealthAnnotationRepo::list_history(&pool, &[])
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_template_keeps_annotation(pool: PgPool) {
    let template = insert_template(&pool, "Arm").await;
    let mut tx = pool.begin().await.unwrap();
    let annotation = HealthAnnotationRepo::create(&mut tx, &new_annotation(template, ""))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    sqlx::query("DELETE FROM annotation_templates WHERE id = $1")
        .bind(template)
        .execute(&pool)
        .await
        .unwrap();

    let fetched = HealthAnnotationRepo::find_by_id(&pool, annotation.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.annotation_template_id, None);
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn file_rows_found_by_url(pool: PgPool) {
    let input = CreateStoredFile {
        file_name: "annotation.png".to_string(),
        file_url: "/private/files/annotation-abc.png".to_string(),
        storage_key: "annotation-abc.png".to_string(),
        attached_to_kind: "HealthAnnotation".to_string(),
        attached_to_id: 1,
        attached_to_field: Some("image".to_string()),
        is_private: true,
        file_size: 68,
        content_hash: "00".repeat(32),
    };

    let mut tx = pool.begin().await.unwrap();
    let created = FileRepo::create(&mut tx, &input).await.unwrap();
    tx.commit().await.unwrap();

    let found = FileRepo::find_by_url(&pool, "/private/files/annotation-abc.png")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.storage_key, "annotation-abc.png");
    assert!(found.is_private);

    // file_url is unique.
    let mut tx = pool.begin().await.unwrap();
    let err = FileRepo::create(&mut tx, &input).await.unwrap_err();
    assert_matches!(err, sqlx::Error::Database(ref db)
        if db.constraint() == Some("uq_files_file_url"));
}
