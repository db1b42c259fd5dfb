use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::episode::EpisodeId;

/// Progress at or above this percentage marks an episode completed
pub const COMPLETION_THRESHOLD_PERCENT: u8 = 90;

/// Identifier of a catalog entry (a series or film)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub u64);

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ContentId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Saved progress for one episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeProgress {
    pub progress_percent: u8,
    pub completed: bool,
    pub last_watched_at: DateTime<Utc>,
}

impl EpisodeProgress {
    /// Started but not finished
    pub fn is_in_progress(&self) -> bool {
        self.progress_percent > 0
            && self.progress_percent < COMPLETION_THRESHOLD_PERCENT
            && !self.completed
    }
}

/// All saved progress for one content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentHistory {
    pub last_watched_at: DateTime<Utc>,
    #[serde(default)]
    pub episodes: BTreeMap<EpisodeId, EpisodeProgress>,
}

/// The persisted watch history, keyed by content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WatchHistory {
    entries: BTreeMap<ContentId, ContentHistory>,
}

impl WatchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn content(&self, content_id: ContentId) -> Option<&ContentHistory> {
        self.entries.get(&content_id)
    }

    pub fn get(&self, content_id: ContentId, episode_id: &EpisodeId) -> Option<&EpisodeProgress> {
        self.entries
            .get(&content_id)
            .and_then(|content| content.episodes.get(episode_id))
    }

    /// Merge one progress write.
    ///
    /// `completed` is forced on at the completion threshold. The caller's
    /// percent always replaces the previous value, even when lower.
    pub fn record(
        &mut self,
        content_id: ContentId,
        episode_id: EpisodeId,
        progress_percent: u8,
        completed: bool,
        now: DateTime<Utc>,
    ) -> EpisodeProgress {
        let progress = EpisodeProgress {
            progress_percent: progress_percent.min(100),
            completed: completed || progress_percent >= COMPLETION_THRESHOLD_PERCENT,
            last_watched_at: now,
        };

        let content = self
            .entries
            .entry(content_id)
            .or_insert_with(|| ContentHistory {
                last_watched_at: now,
                episodes: BTreeMap::new(),
            });
        content.last_watched_at = now;
        content.episodes.insert(episode_id, progress.clone());

        progress
    }

    pub fn content_ids(&self) -> Vec<ContentId> {
        self.entries.keys().copied().collect()
    }

    /// Most recently watched first
    pub fn recent_content_ids(&self, limit: usize) -> Vec<ContentId> {
        let mut items: Vec<(&ContentId, &ContentHistory)> = self.entries.iter().collect();
        items.sort_by(|a, b| b.1.last_watched_at.cmp(&a.1.last_watched_at));
        items.into_iter().take(limit).map(|(id, _)| *id).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
