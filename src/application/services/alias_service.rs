//! Alias map publishing, editing and bulk transfer.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{error, info};

use super::alias_store::AliasStore;
use crate::domain::alias_validator::{self, Normalized};
use crate::domain::entities::AliasMap;
use crate::domain::repositories::SettingsRepository;
use crate::error::AppError;
use crate::infrastructure::cache::AliasCache;
use crate::utils::alias_codec::{self, ExportFile, TransferFormat};

/// Result of a save or import.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// The map as stored after validation.
    pub map: AliasMap,
    /// Number of input entries discarded by validation.
    pub dropped: usize,
}

impl From<Normalized> for SaveOutcome {
    fn from(normalized: Normalized) -> Self {
        Self {
            map: normalized.map,
            dropped: normalized.dropped,
        }
    }
}

/// Entry point for every alias map operation used by the HTTP layer and the
/// admin CLI.
///
/// Reads go through the [`AliasCache`]; writes go through validation and the
/// [`AliasStore`], which invalidates the cache.
pub struct AliasService<S: SettingsRepository + ?Sized> {
    store: AliasStore<S>,
    cache: Arc<AliasCache>,
    last_published: RwLock<Option<AliasMap>>,
}

impl<S: SettingsRepository + ?Sized> AliasService<S> {
    pub fn new(settings: Arc<S>, cache: Arc<AliasCache>) -> Self {
        Self {
            store: AliasStore::new(settings, cache.clone()),
            cache,
            last_published: RwLock::new(None),
        }
    }

    pub fn store(&self) -> &AliasStore<S> {
        &self.store
    }

    /// Returns the published (filtered, cached) alias map.
    ///
    /// Never fails: when the store cannot be read, the last map successfully
    /// published by this process is returned, or an empty map if there is none.
    pub async fn published(&self) -> AliasMap {
        match self.cache.read_through(|| self.store.get()).await {
            Ok(map) => {
                *self.last_published.write().await = Some(map.clone());
                map
            }
            Err(e) => {
                error!(error = %e, "Alias store unavailable; serving last published map");
                self.last_published.read().await.clone().unwrap_or_default()
            }
        }
    }

    /// Returns the stored map, bypassing the cache and the publish filter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn current(&self) -> Result<AliasMap, AppError> {
        self.store.get().await
    }

    /// Validates `raw` and replaces the stored map with the result.
    ///
    /// `raw` may be either a map of alias to destinations or a list of
    /// `{"address", "destinations"}` entries. Invalid entries are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage or cache errors.
    pub async fn save(&self, raw: &Value) -> Result<SaveOutcome, AppError> {
        let outcome = SaveOutcome::from(alias_validator::normalize(raw));
        self.store.save(&outcome.map).await?;

        info!(
            aliases = outcome.map.len(),
            dropped = outcome.dropped,
            "Alias map replaced"
        );
        Ok(outcome)
    }

    /// Decodes an uploaded file and replaces the stored map with its content.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidFormat`] if the file cannot be decoded, or
    /// [`AppError::Internal`] on storage errors.
    pub async fn import(
        &self,
        format: TransferFormat,
        bytes: &[u8],
    ) -> Result<SaveOutcome, AppError> {
        let raw = alias_codec::decode(format, bytes)?;
        let outcome = SaveOutcome::from(alias_validator::normalize(&raw));
        self.store.save(&outcome.map).await?;

        info!(
            %format,
            aliases = outcome.map.len(),
            dropped = outcome.dropped,
            "Alias map imported"
        );
        Ok(outcome)
    }

    /// Encodes the stored map as a downloadable file dated today.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage or encoding errors.
    pub async fn export(&self, format: TransferFormat) -> Result<ExportFile, AppError> {
        let map = self.store.get().await?;
        let file = alias_codec::export_file(format, &map, Utc::now().date_naive())?;

        info!(%format, aliases = map.len(), "Alias map exported");
        Ok(file)
    }

    /// Removes all stored alias data and the cache entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage or cache errors.
    pub async fn purge(&self) -> Result<(), AppError> {
        self.store.purge().await?;
        *self.last_published.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::alias_store::{BACKUP_KEY, PRIMARY_KEY};
    use crate::domain::repositories::MockSettingsRepository;
    use crate::infrastructure::cache::{DEFAULT_TTL_SECONDS, MemoryCache, NullCache, PublishHooks};
    use crate::infrastructure::persistence::MemorySettingsRepository;
    use serde_json::json;

    fn memory_cache() -> Arc<AliasCache> {
        Arc::new(AliasCache::new(
            Arc::new(MemoryCache::new()),
            PublishHooks::default(),
            DEFAULT_TTL_SECONDS,
        ))
    }

    fn memory_service() -> AliasService<MemorySettingsRepository> {
        AliasService::new(Arc::new(MemorySettingsRepository::new()), memory_cache())
    }

    #[tokio::test]
    async fn test_published_is_served_from_cache() {
        let mut settings = MockSettingsRepository::new();
        settings
            .expect_get()
            .withf(|key| key == PRIMARY_KEY)
            .times(1)
            .returning(|_| Ok(Some(json!({"a@x.com": ["b@y.com"]}))));

        let service = AliasService::new(Arc::new(settings), memory_cache());

        let first = service.published().await;
        let second = service.published().await;

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[tokio::test]
    async fn test_save_is_visible_to_next_read() {
        let service = memory_service();
        service
            .save(&json!({"a@x.com": ["b@y.com"]}))
            .await
            .unwrap();
        assert_eq!(service.published().await.len(), 1);

        service
            .save(&json!({"c@x.com": ["d@y.com"], "e@x.com": ["f@y.com"]}))
            .await
            .unwrap();

        let published = service.published().await;
        assert_eq!(published.len(), 2);
        assert!(published.get("a@x.com").is_none());
    }

    #[tokio::test]
    async fn test_save_reports_dropped_entries() {
        let service = memory_service();

        let outcome = service
            .save(&json!({
                "good@x.com": ["dest@y.com"],
                "not-an-email": ["dest@y.com"],
                "empty@x.com": ["nope"]
            }))
            .await
            .unwrap();

        assert_eq!(outcome.map.len(), 1);
        assert_eq!(outcome.dropped, 2);
        assert_eq!(service.current().await.unwrap(), outcome.map);
    }

    #[tokio::test]
    async fn test_published_applies_filter_but_current_does_not() {
        let hooks = PublishHooks::default().with_filter(|_| AliasMap::new());
        let cache = Arc::new(AliasCache::new(
            Arc::new(MemoryCache::new()),
            hooks,
            DEFAULT_TTL_SECONDS,
        ));
        let service = AliasService::new(Arc::new(MemorySettingsRepository::new()), cache);
        service
            .save(&json!({"a@x.com": ["b@y.com"]}))
            .await
            .unwrap();

        assert!(service.published().await.is_empty());
        assert_eq!(service.current().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_published_falls_back_to_last_good_map() {
        let mut settings = MockSettingsRepository::new();
        let mut calls = 0;
        settings.expect_get().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(Some(json!({"a@x.com": ["b@y.com"]})))
            } else {
                Err(AppError::internal("Database error", json!({})))
            }
        });

        let cache = Arc::new(AliasCache::new(
            Arc::new(NullCache::new()),
            PublishHooks::default(),
            DEFAULT_TTL_SECONDS,
        ));
        let service = AliasService::new(Arc::new(settings), cache);

        let first = service.published().await;
        let second = service.published().await;

        assert_eq!(first.len(), 1);
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_published_serves_backup_when_restore_fails() {
        let mut settings = MockSettingsRepository::new();
        settings
            .expect_get()
            .withf(|key| key == PRIMARY_KEY)
            .returning(|_| Ok(Some(json!({}))));
        settings
            .expect_get()
            .withf(|key| key == BACKUP_KEY)
            .returning(|_| Ok(Some(json!({"a@x.com": ["b@y.com"]}))));
        settings
            .expect_set()
            .returning(|_, _| Err(AppError::internal("Database error", json!({}))));

        let service = AliasService::new(Arc::new(settings), memory_cache());

        let published = service.published().await;

        assert_eq!(
            published.get("a@x.com"),
            Some(&["b@y.com".to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_published_without_history_is_empty_on_error() {
        let mut settings = MockSettingsRepository::new();
        settings
            .expect_get()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let service = AliasService::new(Arc::new(settings), memory_cache());

        assert!(service.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_import_csv() {
        let service = memory_service();
        let csv = "Alias,Destinations\nhelp@acme.com,\"agent1@acme.com, agent2@acme.com\"\n";

        let outcome = service
            .import(TransferFormat::Csv, csv.as_bytes())
            .await
            .unwrap();

        assert_eq!(
            outcome.map.get("help@acme.com"),
            Some(&["agent1@acme.com".to_string(), "agent2@acme.com".to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_import_invalid_json_leaves_store_untouched() {
        let service = memory_service();
        service
            .save(&json!({"a@x.com": ["b@y.com"]}))
            .await
            .unwrap();

        let result = service.import(TransferFormat::Json, b"{not json").await;

        assert!(matches!(result, Err(AppError::InvalidFormat { .. })));
        assert_eq!(service.current().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_export_then_import_round_trip() {
        let service = memory_service();
        service
            .save(&json!({"a@x.com": ["b@y.com", "c@y.com"], "d@x.com": ["e@y.com"]}))
            .await
            .unwrap();
        let before = service.current().await.unwrap();

        for format in [TransferFormat::Json, TransferFormat::Csv] {
            let file = service.export(format).await.unwrap();
            service.purge().await.unwrap();
            service.import(format, &file.body).await.unwrap();

            assert_eq!(service.current().await.unwrap(), before);
        }
    }

    #[tokio::test]
    async fn test_export_filename_uses_format_extension() {
        let service = memory_service();

        let file = service.export(TransferFormat::Csv).await.unwrap();

        assert!(file.filename.starts_with("email-aliases-"));
        assert!(file.filename.ends_with(".csv"));
    }

    #[tokio::test]
    async fn test_purge_clears_published_map() {
        let service = memory_service();
        service
            .save(&json!({"a@x.com": ["b@y.com"]}))
            .await
            .unwrap();
        service.published().await;

        service.purge().await.unwrap();

        assert!(service.published().await.is_empty());
    }
}
