// src/repositories/settings_repository.rs

use std::sync::Arc;

use crate::domain::settings::PlayerSettings;
use crate::error::AppResult;
use crate::repositories::key_value_store::KeyValueStore;

pub const SETTINGS_KEY: &str = "settings";

pub trait SettingsRepository: Send + Sync {
    fn load(&self) -> AppResult<Option<PlayerSettings>>;

    fn save(&self, settings: &PlayerSettings) -> AppResult<()>;
}

pub struct KvSettingsRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KvSettingsRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl SettingsRepository for KvSettingsRepository {
    fn load(&self) -> AppResult<Option<PlayerSettings>> {
        match self.store.get(SETTINGS_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, settings: &PlayerSettings) -> AppResult<()> {
        let raw = serde_json::to_string(settings)?;
        self.store.set(SETTINGS_KEY, &raw)
    }
}
