//! API route configuration.

use crate::api::handlers::{
    aliases_handler, export_handler, get_aliases_handler, import_handler, purge_handler,
    save_aliases_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Unauthenticated read routes consumed by the mail-forwarding worker.
///
/// # Endpoints
///
/// - `GET /aliases`     - Published alias map
/// - `GET /api/aliases` - Alternate path with the same contract
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/aliases", get(aliases_handler))
        .route("/api/aliases", get(aliases_handler))
}

/// Admin routes, protected by Bearer token authentication.
///
/// Paths are relative to the `/admin` prefix.
///
/// # Endpoints
///
/// - `GET    /aliases` - Stored alias map
/// - `PUT    /aliases` - Replace the alias map
/// - `DELETE /aliases` - Remove the alias map, its backup and the cache entry
/// - `POST   /import`  - Replace the alias map from an uploaded JSON/CSV file
/// - `GET    /export`  - Download the alias map as JSON/CSV
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/aliases",
            get(get_aliases_handler)
                .put(save_aliases_handler)
                .delete(purge_handler),
        )
        .route("/import", post(import_handler))
        .route("/export", get(export_handler))
}
