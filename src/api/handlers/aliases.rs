//! Handler for the public alias map endpoint.

use axum::{Json, extract::State};

use crate::domain::entities::AliasMap;
use crate::state::AppState;

/// Returns the published alias map.
///
/// # Endpoint
///
/// `GET /aliases` (also served at `GET /api/aliases`)
///
/// No authentication: the map is fetched by the external mail-forwarding
/// worker.
///
/// # Response
///
/// ```json
/// {
///   "sales@example.com": ["alice@example.com", "bob@example.com"]
/// }
/// ```
///
/// Served from the cache when possible. This endpoint never fails: if the
/// store is unavailable the last published map (or `{}`) is returned.
pub async fn aliases_handler(State(state): State<AppState>) -> Json<AliasMap> {
    Json(state.alias_service.published().await)
}
