// src/services/resume_resolver.rs
//
// Resume Resolver - "continue watching" decision
//
// Pure function of (episode list, watch history snapshot). Same inputs
// always give the same ResumePoint.

use std::sync::Arc;

use crate::domain::{ContentId, Episode, EpisodeProgress, ResumePoint, WatchHistory};
use crate::services::progress_store::ProgressStore;

/// Resolve where to continue watching `content_id`.
///
/// 1. The most recently touched in-progress episode, at its saved offset
/// 2. Otherwise the episode after the completed run from episode one
/// 3. Otherwise nothing; the caller starts from the first episode
pub fn resolve(
    history: &WatchHistory,
    content_id: ContentId,
    episodes: &[Episode],
) -> Option<ResumePoint> {
    if episodes.is_empty() {
        return None;
    }
    let content = history.content(content_id)?;

    let mut sorted: Vec<&Episode> = episodes.iter().collect();
    sorted.sort_by_key(|e| e.ordinal);

    let mut latest: Option<(&Episode, &EpisodeProgress)> = None;
    for episode in sorted.iter().copied() {
        let Some(progress) = content.episodes.get(&episode.id) else {
            continue;
        };
        if !progress.is_in_progress() {
            continue;
        }
        // Strictly newer only, so ties keep the lowest ordinal
        let newer = latest
            .map(|(_, best)| progress.last_watched_at > best.last_watched_at)
            .unwrap_or(true);
        if newer {
            latest = Some((episode, progress));
        }
    }

    if let Some((episode, progress)) = latest {
        return Some(ResumePoint {
            episode: episode.clone(),
            start_time_seconds: offset_seconds(episode, progress.progress_percent),
            is_next_unwatched: false,
        });
    }

    let completed_run = sorted
        .iter()
        .take_while(|e| {
            content
                .episodes
                .get(&e.id)
                .map(|p| p.completed)
                .unwrap_or(false)
        })
        .count();

    if completed_run == 0 {
        return None;
    }

    sorted.get(completed_run).map(|next| ResumePoint {
        episode: (*next).clone(),
        start_time_seconds: 0,
        is_next_unwatched: true,
    })
}

/// Where an episode should begin when it is opened directly
pub fn start_offset(episode: &Episode, progress: Option<&EpisodeProgress>) -> f64 {
    if let Some(start) = episode.start_time_override {
        return start;
    }
    match progress {
        Some(p) if p.is_in_progress() => offset_seconds(episode, p.progress_percent) as f64,
        _ => 0.0,
    }
}

fn offset_seconds(episode: &Episode, percent: u8) -> u64 {
    (f64::from(percent) / 100.0 * episode.duration_seconds).floor() as u64
}

/// Resolver bound to the live progress store
pub struct ResumeResolver {
    store: Arc<ProgressStore>,
}

impl ResumeResolver {
    pub fn new(store: Arc<ProgressStore>) -> Self {
        Self { store }
    }

    pub fn resolve(&self, content_id: ContentId, episodes: &[Episode]) -> Option<ResumePoint> {
        resolve(&self.store.snapshot(), content_id, episodes)
    }

    pub fn start_offset(&self, content_id: ContentId, episode: &Episode) -> f64 {
        start_offset(episode, self.store.get(content_id, &episode.id).as_ref())
    }
}
