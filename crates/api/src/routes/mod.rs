pub mod annotation;
pub mod files;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /annotations                                     save (POST)
/// /annotations/records                             templates + treatments (GET)
/// /annotations/history                             patient history (GET, ?doctype&docname)
/// /annotations/{id}                                get one (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health annotations: palette config, history, save.
        .nest("/annotations", annotation::router())
}
