#![allow(dead_code)]

use alias_manager::api::handlers::{
    aliases_handler, export_handler, get_aliases_handler, health_handler, import_handler,
    purge_handler, save_aliases_handler,
};
use alias_manager::api::middleware::auth;
use alias_manager::application::services::AuthService;
use alias_manager::application::services::auth_service::hash_token;
use alias_manager::domain::repositories::SettingsRepository;
use alias_manager::infrastructure::cache::{
    AliasCache, DEFAULT_TTL_SECONDS, MemoryCache, PublishHooks,
};
use alias_manager::infrastructure::persistence::MemorySettingsRepository;
use alias_manager::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use axum_test::TestServer;
use std::sync::Arc;

pub const TEST_SECRET: &str = "test-signing-secret";
pub const TEST_TOKEN: &str = "test-admin-token";
pub const DEFAULT_MAX_IMPORT_BYTES: usize = 5 * 1024 * 1024;

pub fn create_test_state() -> AppState {
    create_test_state_with(PublishHooks::default(), DEFAULT_MAX_IMPORT_BYTES)
}

pub fn create_test_state_with(hooks: PublishHooks, max_import_bytes: usize) -> AppState {
    let settings: Arc<dyn SettingsRepository> = Arc::new(MemorySettingsRepository::new());
    let cache = Arc::new(AliasCache::new(
        Arc::new(MemoryCache::new()),
        hooks,
        DEFAULT_TTL_SECONDS,
    ));
    let auth_service = AuthService::new(
        TEST_SECRET.to_string(),
        &[hash_token(TEST_SECRET, TEST_TOKEN)],
    );

    AppState::new(settings, cache, auth_service, max_import_bytes)
}

/// Public and admin routes without rate limiting, which needs peer addresses.
pub fn make_router(state: AppState) -> Router {
    let admin = Router::new()
        .route(
            "/aliases",
            get(get_aliases_handler)
                .put(save_aliases_handler)
                .delete(purge_handler),
        )
        .route("/import", post(import_handler))
        .route("/export", get(export_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    Router::new()
        .route("/aliases", get(aliases_handler))
        .route("/api/aliases", get(aliases_handler))
        .route("/health", get(health_handler))
        .nest("/admin", admin)
        .with_state(state)
}

pub fn make_server(state: AppState) -> TestServer {
    TestServer::new(make_router(state)).unwrap()
}
