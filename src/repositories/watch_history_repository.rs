// src/repositories/watch_history_repository.rs
//
// Watch History Repository
//
// CRITICAL RULES:
// - Dumb data mapper: the whole history is one JSON document
// - NO completion rules here (see domain::history)

use std::sync::Arc;

use crate::domain::history::WatchHistory;
use crate::error::AppResult;
use crate::repositories::key_value_store::KeyValueStore;

/// Storage key holding the serialized history map
pub const WATCH_HISTORY_KEY: &str = "watch_history";

pub trait WatchHistoryRepository: Send + Sync {
    /// Missing document loads as an empty history
    fn load(&self) -> AppResult<WatchHistory>;

    fn save(&self, history: &WatchHistory) -> AppResult<()>;

    fn clear(&self) -> AppResult<()>;
}

pub struct KvWatchHistoryRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KvWatchHistoryRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl WatchHistoryRepository for KvWatchHistoryRepository {
    fn load(&self) -> AppResult<WatchHistory> {
        match self.store.get(WATCH_HISTORY_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(WatchHistory::default()),
        }
    }

    fn save(&self, history: &WatchHistory) -> AppResult<()> {
        let raw = serde_json::to_string(history)?;
        self.store.set(WATCH_HISTORY_KEY, &raw)
    }

    fn clear(&self) -> AppResult<()> {
        self.store.remove(WATCH_HISTORY_KEY)
    }
}
