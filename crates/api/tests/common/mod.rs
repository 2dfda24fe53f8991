#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use annotation_api::config::{LogFormat, ServerConfig};
use annotation_api::router::build_app_router;
use annotation_api::state::AppState;
use annotation_core::error::CoreError;
use annotation_core::storage::{FileStore, LocalFileStore};

/// A 1x1 transparent PNG.
pub const PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// The same PNG as a data URL.
pub fn png_data_url() -> String {
    format!("data:image/png;base64,{PNG_BASE64}")
}

/// Build a test `ServerConfig` with safe defaults, storing files under `root`.
pub fn test_config(root: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        file_storage_root: root,
        max_upload_bytes: 1024 * 1024,
        log_format: LogFormat::Pretty,
    }
}

/// A test application together with the temporary directory backing its
/// file store. Dropping it removes the directory.
pub struct TestApp {
    pub router: Router,
    pub storage: tempfile::TempDir,
}

impl TestApp {
    /// Fresh router clone for one request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Number of blobs currently in the file store.
    pub fn stored_file_count(&self) -> usize {
        std::fs::read_dir(self.storage.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and a local file store in a temporary directory.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let storage = tempfile::tempdir().unwrap();
    let store = LocalFileStore::new(storage.path());
    build_with_store(pool, storage, Arc::new(store))
}

/// Same as [`build_test_app`] but with a file store whose reads succeed and
/// whose writes always fail.
pub fn build_test_app_with_failing_store(pool: PgPool) -> TestApp {
    let storage = tempfile::tempdir().unwrap();
    build_with_store(pool, storage, Arc::new(FailingFileStore))
}

fn build_with_store(
    pool: PgPool,
    storage: tempfile::TempDir,
    file_store: Arc<dyn FileStore>,
) -> TestApp {
    let config = test_config(storage.path().to_path_buf());
    let state = AppState {
        pool,
        file_store,
    };
    TestApp {
        router: build_app_router(state, &config),
        storage,
    }
}

/// File store that refuses every write.
pub struct FailingFileStore;

#[async_trait]
impl FileStore for FailingFileStore {
    async fn put(&self, _key: &str, _bytes: &[u8]) -> Result<(), CoreError> {
        Err(CoreError::Internal("disk full".into()))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, CoreError> {
        Err(CoreError::not_found("File", key))
    }

    async fn delete(&self, _key: &str) -> Result<(), CoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the response has `status` and the given error `code`.
pub async fn assert_error(response: Response, status: StatusCode, code: &str) -> serde_json::Value {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code, "unexpected error body: {json}");
    json
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

pub async fn count(pool: &PgPool, table: &str) -> i64 {
    let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap();
    n
}

pub async fn insert_template(pool: &PgPool, label: &str) -> i64 {
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO annotation_templates (label) VALUES ($1) RETURNING id")
            .bind(label)
            .fetch_one(pool)
            .await
            .unwrap();
    id
}

pub async fn insert_patient(pool: &PgPool, name: &str) -> i64 {
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO patients (full_name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap();
    id
}

pub async fn insert_encounter(pool: &PgPool, patient_id: i64) -> i64 {
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO patient_encounters (patient_id) VALUES ($1) RETURNING id")
            .bind(patient_id)
            .fetch_one(pool)
            .await
            .unwrap();
    id
}

pub async fn insert_procedure(pool: &PgPool, patient_id: i64) -> i64 {
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO clinical_procedures (patient_id) VALUES ($1) RETURNING id")
            .bind(patient_id)
            .fetch_one(pool)
            .await
            .unwrap();
    id
}
