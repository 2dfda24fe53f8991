//! Route definitions for private file downloads.

use axum::routing::get;
use axum::Router;

use crate::handlers::files;
use crate::state::AppState;

/// Private file routes, mounted at the root so stored `file_url` values
/// resolve as-is.
///
/// ```text
/// GET    /private/files/{file_name}    download_private_file
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/private/files/{file_name}",
        get(files::download_private_file),
    )
}
