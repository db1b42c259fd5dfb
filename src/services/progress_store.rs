// src/services/progress_store.rs
//
// Progress Store - per-episode watch progress
//
// CRITICAL RULES:
// - Every write is read-merge-write of the whole history document
// - Storage failures are logged and swallowed: reads degrade to an
//   empty history, writes are lost for that call
// - Completion is promoted at 90% regardless of the caller's flag

use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::sync::Arc;

use crate::domain::{ContentId, EpisodeId, EpisodeProgress, WatchHistory};
use crate::integrations::{ContentFetcher, ContentSummary};
use crate::repositories::WatchHistoryRepository;
use crate::runtime::clock::Clock;

pub struct ProgressStore {
    repo: Arc<dyn WatchHistoryRepository>,
    clock: Arc<dyn Clock>,
}

impl ProgressStore {
    pub fn new(repo: Arc<dyn WatchHistoryRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Current history; empty when storage cannot be read
    pub fn snapshot(&self) -> WatchHistory {
        match self.repo.load() {
            Ok(history) => history,
            Err(e) => {
                warn!("watch history unreadable, using empty history: {}", e);
                WatchHistory::default()
            }
        }
    }

    pub fn get(&self, content_id: ContentId, episode_id: &EpisodeId) -> Option<EpisodeProgress> {
        self.snapshot().get(content_id, episode_id).cloned()
    }

    /// Merge a progress write and persist the whole map.
    ///
    /// Returns the record as merged, even if persisting it failed.
    pub fn update(
        &self,
        content_id: ContentId,
        episode_id: &EpisodeId,
        progress_percent: u8,
        completed: bool,
    ) -> EpisodeProgress {
        let mut history = self.snapshot();
        let progress = history.record(
            content_id,
            episode_id.clone(),
            progress_percent,
            completed,
            self.clock.now_utc(),
        );

        match self.repo.save(&history) {
            Ok(()) => debug!(
                "saved progress {}% for content {} episode {}",
                progress.progress_percent, content_id, episode_id
            ),
            Err(e) => warn!(
                "failed to save progress for content {} episode {}: {}",
                content_id, episode_id, e
            ),
        }

        progress
    }

    pub fn mark_watched(&self, content_id: ContentId, episode_id: &EpisodeId) -> EpisodeProgress {
        self.update(content_id, episode_id, 100, true)
    }

    pub fn is_watched(&self, content_id: ContentId, episode_id: &EpisodeId) -> bool {
        self.get(content_id, episode_id)
            .map(|p| p.completed)
            .unwrap_or(false)
    }

    pub fn is_in_progress(&self, content_id: ContentId, episode_id: &EpisodeId) -> bool {
        self.get(content_id, episode_id)
            .map(|p| p.is_in_progress())
            .unwrap_or(false)
    }

    /// 0 when the episode has no record
    pub fn get_percentage(&self, content_id: ContentId, episode_id: &EpisodeId) -> u8 {
        self.get(content_id, episode_id)
            .map(|p| p.progress_percent)
            .unwrap_or(0)
    }

    pub fn get_watch_date(
        &self,
        content_id: ContentId,
        episode_id: &EpisodeId,
    ) -> Option<DateTime<Utc>> {
        self.get(content_id, episode_id).map(|p| p.last_watched_at)
    }

    /// Content IDs, most recently watched first
    pub fn list_recently_watched(&self, limit: usize) -> Vec<ContentId> {
        self.snapshot().recent_content_ids(limit)
    }

    /// Recently watched content joined against the catalog.
    /// IDs the catalog cannot resolve are skipped.
    pub async fn list_recently_watched_hydrated(
        &self,
        limit: usize,
        fetcher: &dyn ContentFetcher,
    ) -> Vec<ContentSummary> {
        let mut items = Vec::new();
        for id in self.list_recently_watched(limit) {
            match fetcher.fetch_content(id).await {
                Ok(summary) => items.push(summary),
                Err(e) => debug!("skipping content {} in recent list: {}", id, e),
            }
        }
        items
    }

    pub fn content_ids(&self) -> Vec<ContentId> {
        self.snapshot().content_ids()
    }

    /// Bulk "clear history"
    pub fn clear(&self) {
        if let Err(e) = self.repo.clear() {
            warn!("failed to clear watch history: {}", e);
        }
    }
}
