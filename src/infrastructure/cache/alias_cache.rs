//! Read-through cache of the published alias map.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use super::service::{CacheResult, CacheService};
use crate::domain::entities::AliasMap;
use crate::error::AppError;

/// Cache key of the published alias map.
pub const CACHE_KEY: &str = "email_aliases_cache";

/// Default lifetime of the published alias map in seconds.
pub const DEFAULT_TTL_SECONDS: u64 = 3600;

/// Transform applied to the alias map before it is published.
pub type FilterHook = Arc<dyn Fn(AliasMap) -> AliasMap + Send + Sync>;

/// Maps the configured default TTL to the TTL actually used.
pub type TtlHook = Arc<dyn Fn(u64) -> u64 + Send + Sync>;

/// Extension points applied when the cache is populated.
///
/// Both hooks default to the identity.
#[derive(Clone)]
pub struct PublishHooks {
    pub filter: FilterHook,
    pub ttl: TtlHook,
}

impl PublishHooks {
    pub fn with_filter(
        mut self,
        filter: impl Fn(AliasMap) -> AliasMap + Send + Sync + 'static,
    ) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    pub fn with_ttl(mut self, ttl: impl Fn(u64) -> u64 + Send + Sync + 'static) -> Self {
        self.ttl = Arc::new(ttl);
        self
    }
}

impl Default for PublishHooks {
    fn default() -> Self {
        Self {
            filter: Arc::new(|map| map),
            ttl: Arc::new(|ttl| ttl),
        }
    }
}

/// Time-bounded cached view of the published alias map.
///
/// The cache entry holds the *filtered* map serialized as JSON. It is never a
/// source of truth: every mutation of the alias store must call
/// [`AliasCache::invalidate`], and the next read repopulates it.
///
/// Concurrent misses may both run the loader and both write the entry; the
/// writes carry the same value, so the race is harmless.
pub struct AliasCache {
    backend: Arc<dyn CacheService>,
    hooks: PublishHooks,
    default_ttl: u64,
}

impl AliasCache {
    pub fn new(backend: Arc<dyn CacheService>, hooks: PublishHooks, default_ttl: u64) -> Self {
        Self {
            backend,
            hooks,
            default_ttl,
        }
    }

    /// Returns the cached map, or loads, filters and caches it on a miss.
    ///
    /// # Request Flow
    ///
    /// 1. On hit (unexpired entry present), return the cached map
    /// 2. On miss, call `loader`
    /// 3. Apply the filter hook exactly once
    /// 4. Store the filtered map for `ttl_hook(default_ttl)` seconds
    /// 5. Return the filtered map
    ///
    /// A failure to write the entry is logged and does not fail the read.
    ///
    /// # Errors
    ///
    /// Propagates errors returned by `loader`.
    pub async fn read_through<F, Fut>(&self, loader: F) -> Result<AliasMap, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AliasMap, AppError>>,
    {
        if let Some(map) = self.cached().await {
            metrics::counter!("alias_cache_hits_total").increment(1);
            return Ok(map);
        }
        metrics::counter!("alias_cache_misses_total").increment(1);

        let published = (self.hooks.filter)(loader().await?);
        let ttl = (self.hooks.ttl)(self.default_ttl);

        match serde_json::to_string(&published) {
            Ok(encoded) => {
                if let Err(e) = self.backend.set(CACHE_KEY, &encoded, ttl).await {
                    warn!(error = %e, "Failed to populate alias cache");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode alias map for caching"),
        }

        debug!(aliases = published.len(), ttl, "Alias cache populated");
        Ok(published)
    }

    /// Returns the currently cached map, if any.
    ///
    /// An entry that cannot be decoded is treated as a miss.
    pub async fn cached(&self) -> Option<AliasMap> {
        let raw = match self.backend.get(CACHE_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Alias cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(map) => Some(map),
            Err(e) => {
                warn!(error = %e, "Discarding undecodable alias cache entry");
                None
            }
        }
    }

    /// Removes the cache entry unconditionally.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the delete could not be confirmed.
    pub async fn invalidate(&self) -> CacheResult<()> {
        self.backend.delete(CACHE_KEY).await?;
        debug!("Alias cache invalidated");
        Ok(())
    }

    pub fn backend(&self) -> &Arc<dyn CacheService> {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AliasEntry;
    use crate::infrastructure::cache::{MemoryCache, NullCache};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn map_of(alias: &str, destination: &str) -> AliasMap {
        [AliasEntry {
            alias: alias.to_string(),
            destinations: vec![destination.to_string()],
        }]
        .into_iter()
        .collect()
    }

    fn counting_loader(
        calls: &AtomicUsize,
        map: AliasMap,
    ) -> impl Future<Output = Result<AliasMap, AppError>> + '_ {
        calls.fetch_add(1, Ordering::SeqCst);
        async move { Ok(map) }
    }

    #[tokio::test]
    async fn test_second_read_is_a_hit() {
        let cache = AliasCache::new(
            Arc::new(MemoryCache::new()),
            PublishHooks::default(),
            DEFAULT_TTL_SECONDS,
        );
        let calls = AtomicUsize::new(0);

        let first = cache
            .read_through(|| counting_loader(&calls, map_of("a@x.com", "b@y.com")))
            .await
            .unwrap();
        let second = cache
            .read_through(|| counting_loader(&calls, map_of("other@x.com", "b@y.com")))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let cache = AliasCache::new(
            Arc::new(MemoryCache::new()),
            PublishHooks::default(),
            DEFAULT_TTL_SECONDS,
        );
        let calls = AtomicUsize::new(0);

        cache
            .read_through(|| counting_loader(&calls, map_of("a@x.com", "b@y.com")))
            .await
            .unwrap();
        cache.invalidate().await.unwrap();
        let reloaded = cache
            .read_through(|| counting_loader(&calls, map_of("c@x.com", "d@y.com")))
            .await
            .unwrap();

        assert_eq!(reloaded, map_of("c@x.com", "d@y.com"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_filter_result_is_cached_and_applied_once() {
        let filter_calls = Arc::new(AtomicUsize::new(0));
        let counter = filter_calls.clone();
        let hooks = PublishHooks::default().with_filter(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            map_of("filtered@x.com", "z@y.com")
        });
        let cache = AliasCache::new(Arc::new(MemoryCache::new()), hooks, DEFAULT_TTL_SECONDS);
        let calls = AtomicUsize::new(0);

        let first = cache
            .read_through(|| counting_loader(&calls, map_of("a@x.com", "b@y.com")))
            .await
            .unwrap();
        let second = cache
            .read_through(|| counting_loader(&calls, map_of("a@x.com", "b@y.com")))
            .await
            .unwrap();

        assert_eq!(first, map_of("filtered@x.com", "z@y.com"));
        assert_eq!(second, first);
        assert_eq!(filter_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ttl_hook_receives_default_and_zero_disables_caching() {
        let seen = Arc::new(AtomicUsize::new(0));
        let recorder = seen.clone();
        let hooks = PublishHooks::default().with_ttl(move |default| {
            recorder.store(default as usize, Ordering::SeqCst);
            0
        });
        let cache = AliasCache::new(Arc::new(MemoryCache::new()), hooks, 1234);
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .read_through(|| counting_loader(&calls, map_of("a@x.com", "b@y.com")))
                .await
                .unwrap();
        }

        assert_eq!(seen.load(Ordering::SeqCst), 1234);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_loader_error_is_propagated_and_nothing_cached() {
        let cache = AliasCache::new(
            Arc::new(MemoryCache::new()),
            PublishHooks::default(),
            DEFAULT_TTL_SECONDS,
        );

        let result = cache
            .read_through(|| async {
                Err(AppError::internal("boom", serde_json::json!({})))
            })
            .await;

        assert!(result.is_err());
        assert!(cache.cached().await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let backend = Arc::new(MemoryCache::new());
        backend.set(CACHE_KEY, "not json", 60).await.unwrap();
        let cache = AliasCache::new(backend, PublishHooks::default(), DEFAULT_TTL_SECONDS);

        assert!(cache.cached().await.is_none());
    }

    #[tokio::test]
    async fn test_null_backend_always_loads() {
        let cache = AliasCache::new(
            Arc::new(NullCache::new()),
            PublishHooks::default(),
            DEFAULT_TTL_SECONDS,
        );
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            cache
                .read_through(|| counting_loader(&calls, AliasMap::new()))
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
