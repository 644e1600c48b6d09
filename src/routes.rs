//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /aliases`     - Published alias map (public)
//! - `GET  /api/aliases` - Same contract on an alternate path (public)
//! - `GET  /health`      - Health check: storage, cache (public)
//! - `/admin/*`          - Alias administration (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Authentication** - Bearer token on admin routes
//! - **Body limit** - Admin request bodies bounded by `MAX_IMPORT_BYTES`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Room for multipart boundaries and the `format` field around the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    let admin_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(
            state.max_import_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
        ))
        .layer(rate_limit::secure_layer(behind_proxy));

    let public_router = api::routes::public_routes()
        .route("/health", get(health_handler))
        .layer(rate_limit::layer(behind_proxy));

    let router = Router::new()
        .merge(public_router)
        .nest("/admin", admin_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
