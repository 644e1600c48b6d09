//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{AliasService, AuthService};
use crate::domain::repositories::SettingsRepository;
use crate::infrastructure::cache::AliasCache;

/// Alias service over whichever settings backend was configured at startup.
pub type DynAliasService = AliasService<dyn SettingsRepository>;

#[derive(Clone)]
pub struct AppState {
    pub alias_service: Arc<DynAliasService>,
    pub auth_service: Arc<AuthService>,
    pub settings: Arc<dyn SettingsRepository>,
    pub cache: Arc<AliasCache>,
    /// Upload limit for `POST /admin/import`, in bytes.
    pub max_import_bytes: usize,
}

impl AppState {
    pub fn new(
        settings: Arc<dyn SettingsRepository>,
        cache: Arc<AliasCache>,
        auth_service: AuthService,
        max_import_bytes: usize,
    ) -> Self {
        let alias_service = Arc::new(AliasService::new(settings.clone(), cache.clone()));

        Self {
            alias_service,
            auth_service: Arc::new(auth_service),
            settings,
            cache,
            max_import_bytes,
        }
    }
}
