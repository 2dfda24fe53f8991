//! Route definitions for health annotations.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::annotation;
use crate::state::AppState;

/// Annotation routes, nested under `/annotations`.
///
/// ```text
/// POST   /                 save_annotation
/// GET    /records          annotations_records
/// GET    /history          get_annotation_history (?doctype, ?docname)
/// GET    /{id}             get_annotation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(annotation::save_annotation))
        .route("/records", get(annotation::annotations_records))
        .route("/history", get(annotation::get_annotation_history))
        .route("/{id}", get(annotation::get_annotation))
}
