//! Repository trait for the persistent key-value settings store.

use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;

/// Persistent key-value store holding JSON documents under string keys.
///
/// This is the durable half of the admin host: the alias map and its backup
/// copy are stored here. Each `set` replaces the whole value for a key.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgSettingsRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemorySettingsRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key has never been written or was deleted.
    /// Callers needing a default use `get(key).await?.unwrap_or(default)`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn get(&self, key: &str) -> Result<Option<Value>, AppError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn set(&self, key: &str, value: Value) -> Result<(), AppError>;

    /// Removes `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Checks whether the storage backend is reachable.
    async fn health_check(&self) -> bool;
}
