// src/services/settings_service.rs
//
// Player preferences
//
// Reads fall back to defaults when nothing is stored or the stored
// document is unreadable. Writes are best effort like progress writes.

use log::warn;
use std::sync::Arc;

use crate::domain::PlayerSettings;
use crate::repositories::SettingsRepository;

pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    pub fn load(&self) -> PlayerSettings {
        match self.repo.load() {
            Ok(Some(settings)) => settings,
            Ok(None) => PlayerSettings::default(),
            Err(e) => {
                warn!("settings unreadable, using defaults: {}", e);
                PlayerSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &PlayerSettings) {
        if let Err(e) = self.repo.save(settings) {
            warn!("failed to save settings: {}", e);
        }
    }

    /// Load, modify and save in one step. Returns the saved value.
    pub fn update<F>(&self, change: F) -> PlayerSettings
    where
        F: FnOnce(&mut PlayerSettings),
    {
        let mut settings = self.load();
        change(&mut settings);
        settings.volume = settings.clamped_volume();
        self.save(&settings);
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{InMemoryKeyValueStore, KeyValueStore, KvSettingsRepository, SETTINGS_KEY};

    fn service() -> (SettingsService, Arc<InMemoryKeyValueStore>) {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let repo = Arc::new(KvSettingsRepository::new(kv.clone()));
        (SettingsService::new(repo), kv)
    }

    #[test]
    fn test_defaults_when_empty() {
        let (service, _) = service();
        assert_eq!(service.load(), PlayerSettings::default());
    }

    #[test]
    fn test_update_persists_and_clamps() {
        let (service, _) = service();
        let saved = service.update(|s| {
            s.auto_skip = true;
            s.volume = 3.0;
        });
        assert!(saved.auto_skip);
        assert_eq!(saved.volume, 1.0);
        assert_eq!(service.load(), saved);
    }

    #[test]
    fn test_corrupt_document_falls_back() {
        let (service, kv) = service();
        kv.set(SETTINGS_KEY, "{not json").unwrap();
        assert_eq!(service.load(), PlayerSettings::default());
    }
}
