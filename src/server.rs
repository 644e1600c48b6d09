//! HTTP server initialization and runtime setup.
//!
//! Handles storage and cache setup, alias store activation, and the Axum
//! server lifecycle.

use crate::application::services::AuthService;
use crate::config::{Config, StorageBackend};
use crate::domain::repositories::SettingsRepository;
use crate::infrastructure::cache::{
    AliasCache, CacheService, MemoryCache, NullCache, PublishHooks, RedisCache,
};
use crate::infrastructure::persistence::{MemorySettingsRepository, PgSettingsRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Connection attempts before startup gives up on the database.
const DB_CONNECT_ATTEMPTS: usize = 5;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Settings storage (PostgreSQL with migrations, or process memory)
/// - Cache backend (Redis, process memory, or none)
/// - The alias store (creates an empty map on first start)
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - The alias store cannot be initialized
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let settings = build_settings(&config).await?;
    let cache = build_cache(&config).await;

    let alias_cache = Arc::new(AliasCache::new(
        cache,
        PublishHooks::default(),
        config.cache_ttl_seconds,
    ));

    let auth_service = AuthService::new(
        config.token_signing_secret.clone(),
        &config.admin_token_hashes,
    );
    if !auth_service.is_enabled() {
        tracing::warn!("ADMIN_TOKEN_HASHES is empty; all admin requests will be rejected");
    }

    let state = AppState::new(settings, alias_cache, auth_service, config.max_import_bytes);

    state
        .alias_service
        .store()
        .activate()
        .await
        .context("Failed to initialize alias store")?;

    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Builds the settings repository selected by `STORAGE_BACKEND`.
///
/// # Errors
///
/// Returns an error if PostgreSQL is selected and cannot be reached or migrated.
pub async fn build_settings(config: &Config) -> Result<Arc<dyn SettingsRepository>> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = connect_database(config).await?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;

            Ok(Arc::new(PgSettingsRepository::new(Arc::new(pool))))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; alias data is lost on restart");
            Ok(Arc::new(MemorySettingsRepository::new()))
        }
    }
}

/// Opens the PostgreSQL pool, retrying with exponential backoff.
///
/// # Errors
///
/// Returns the last connection error after all attempts fail.
pub async fn connect_database(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is not configured")?;

    let strategy = ExponentialBackoff::from_millis(10)
        .factor(50)
        .max_delay(Duration::from_secs(10))
        .map(jitter)
        .take(DB_CONNECT_ATTEMPTS);

    let pool = Retry::spawn(strategy, || async move {
        PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
            .idle_timeout(Duration::from_secs(config.db_idle_timeout))
            .max_lifetime(Duration::from_secs(config.db_max_lifetime))
            .connect(database_url)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Database connection attempt failed"))
    })
    .await
    .context("Failed to connect to database")?;

    tracing::info!("Connected to database");
    Ok(pool)
}

/// Selects the cache backend.
///
/// Redis when configured and reachable, otherwise process memory. Falls back
/// instead of failing because the cache is never a source of truth.
pub async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    if config.cache_disabled {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    }

    if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, &config.cache_key_prefix).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                return Arc::new(redis);
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using MemoryCache.", e);
            }
        }
    } else {
        tracing::info!("Redis not configured. Using MemoryCache.");
    }

    Arc::new(MemoryCache::new())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
