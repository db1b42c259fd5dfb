// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic
// - NO event emission
// - NO cross-repository calls

pub mod key_value_store;
pub mod settings_repository;
pub mod watch_history_repository;

pub use key_value_store::{InMemoryKeyValueStore, KeyValueStore, SqliteKeyValueStore};
pub use settings_repository::{KvSettingsRepository, SettingsRepository, SETTINGS_KEY};
pub use watch_history_repository::{
    KvWatchHistoryRepository, WatchHistoryRepository, WATCH_HISTORY_KEY,
};
