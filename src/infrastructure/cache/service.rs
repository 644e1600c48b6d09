//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Transient key-value store with per-entry expiry.
///
/// Reads are fail-open: implementations log backend errors and report a miss,
/// so a broken cache degrades to storage reads. Deletes are not: a failed
/// delete is returned to the caller, because a missed invalidation serves
/// stale data for up to a full TTL.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with server-side expiry
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process cache
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the value stored under `key`, or `None` on miss, expiry or error.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key` for `ttl_seconds`.
    ///
    /// A TTL of zero means the value is not cached at all.
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()>;

    /// Removes `key` unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::OperationError`] if the backend could not confirm the delete.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;

    /// Short backend name used in health reports and logs.
    fn backend(&self) -> &'static str;
}
