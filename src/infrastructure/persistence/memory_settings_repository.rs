//! In-process implementation of the settings repository.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::repositories::SettingsRepository;
use crate::error::AppError;

/// Settings kept in process memory.
///
/// Data is lost on restart. Used by tests and by `STORAGE_BACKEND=memory`
/// for local development.
#[derive(Default)]
pub struct MemorySettingsRepository {
    values: RwLock<HashMap<String, Value>>,
}

impl MemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsRepository for MemorySettingsRepository {
    async fn get(&self, key: &str) -> Result<Option<Value>, AppError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), AppError> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.values.write().await.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
