//! Durable alias map storage with a redundant backup copy.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::domain::entities::AliasMap;
use crate::domain::repositories::SettingsRepository;
use crate::error::AppError;
use crate::infrastructure::cache::AliasCache;

/// Settings key of the primary alias map.
pub const PRIMARY_KEY: &str = "email_aliases_data";

/// Settings key of the backup copy.
pub const BACKUP_KEY: &str = "email_aliases_backup";

/// Owner of the primary and backup copies of the alias map.
///
/// Every write replaces the whole map in both copies and then invalidates the
/// published cache entry. Reads fall back to the backup when the primary is
/// empty and restore the primary from it.
///
/// The backup exists for compatibility with deployments where primary writes
/// were observed to disappear. It does not replace a reliable settings store.
///
/// # Lifecycle
///
/// `Uninitialized → Empty` on [`activate`](Self::activate), then
/// `Empty ⇄ Populated` through whole-map [`save`](Self::save) calls.
pub struct AliasStore<S: SettingsRepository + ?Sized> {
    settings: Arc<S>,
    cache: Arc<AliasCache>,
}

impl<S: SettingsRepository + ?Sized> AliasStore<S> {
    pub fn new(settings: Arc<S>, cache: Arc<AliasCache>) -> Self {
        Self { settings, cache }
    }

    /// Creates an empty primary map if none has ever been stored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn activate(&self) -> Result<(), AppError> {
        if self.settings.get(PRIMARY_KEY).await?.is_none() {
            self.settings.set(PRIMARY_KEY, json!({})).await?;
            info!("Initialized empty alias map");
        }
        Ok(())
    }

    /// Returns the primary alias map.
    ///
    /// If the primary is empty but the backup is not, the backup is returned and
    /// the primary is restored from it, the cache is invalidated, and the
    /// recovery is logged and counted (`alias_store_recoveries_total`). The
    /// restore is best-effort: a failed rewrite does not fail the read.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if either copy cannot be read.
    pub async fn get(&self) -> Result<AliasMap, AppError> {
        let primary = self.load(PRIMARY_KEY).await?;
        if !primary.is_empty() {
            return Ok(primary);
        }

        let backup = self.load(BACKUP_KEY).await?;
        if backup.is_empty() {
            return Ok(primary);
        }

        warn!(
            aliases = backup.len(),
            "Primary alias map is empty; restoring from backup"
        );
        metrics::counter!("alias_store_recoveries_total").increment(1);
        self.restore_primary(&backup).await;

        Ok(backup)
    }

    /// Rewrites the primary from `backup`. Failures are logged and leave the
    /// primary empty, so the next read recovers again.
    async fn restore_primary(&self, backup: &AliasMap) {
        let restored = match serde_json::to_value(backup) {
            Ok(value) => self.settings.set(PRIMARY_KEY, value).await,
            Err(e) => Err(AppError::from(e)),
        };
        if let Err(e) = restored {
            error!(error = %e, "Failed to restore primary alias map from backup");
        }

        let _ = self.invalidate().await;
    }

    /// Replaces the stored alias map with `map`.
    ///
    /// Writes the primary, then the backup, then invalidates the cache. The
    /// cache is invalidated even when a write fails, since the primary may
    /// already have changed; a primary left empty by a partial failure is
    /// recovered by the next [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// Returns the first storage error, or a cache error if invalidation failed.
    pub async fn save(&self, map: &AliasMap) -> Result<(), AppError> {
        let value = serde_json::to_value(map)?;

        let primary = self.settings.set(PRIMARY_KEY, value.clone()).await;
        let backup = match primary {
            Ok(()) => self.settings.set(BACKUP_KEY, value).await,
            Err(_) => Ok(()),
        };
        let invalidated = self.invalidate().await;

        primary?;
        backup?;
        invalidated?;

        debug!(aliases = map.len(), "Alias map saved");
        Ok(())
    }

    /// Removes the primary map, its backup, and the cache entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage or cache errors.
    pub async fn purge(&self) -> Result<(), AppError> {
        self.settings.delete(PRIMARY_KEY).await?;
        self.settings.delete(BACKUP_KEY).await?;
        self.invalidate().await?;

        info!("Alias map, backup and cache purged");
        Ok(())
    }

    /// Reads a stored map; missing or malformed values count as empty.
    async fn load(&self, key: &str) -> Result<AliasMap, AppError> {
        let Some(value) = self.settings.get(key).await? else {
            return Ok(AliasMap::new());
        };

        match serde_json::from_value::<AliasMap>(value) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(key, error = %e, "Stored alias map is malformed; treating as empty");
                Ok(AliasMap::new())
            }
        }
    }

    async fn invalidate(&self) -> Result<(), AppError> {
        self.cache.invalidate().await.map_err(|e| {
            error!(error = %e, "Failed to invalidate alias cache after mutation");
            AppError::from(e)
        })
    }
}
