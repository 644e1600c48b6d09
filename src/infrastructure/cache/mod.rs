//! Caching layer for the published alias map.
//!
//! Provides a [`CacheService`] trait with three implementations:
//! - [`RedisCache`] - Production Redis-backed cache shared across instances
//! - [`MemoryCache`] - Process-local cache used when Redis is unavailable
//! - [`NullCache`] - No-op implementation for testing/disabled caching
//!
//! [`AliasCache`] builds the read-through view of the alias map on top of any of them.

mod alias_cache;
mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use alias_cache::{
    AliasCache, CACHE_KEY, DEFAULT_TTL_SECONDS, FilterHook, PublishHooks, TtlHook,
};
pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};
