// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are UI-friendly representations
// - Timestamps are RFC 3339 strings
// - Conversion FROM domain entities only (never TO)

use serde::{Deserialize, Serialize};

use crate::domain::{EpisodeProgress, ResumePoint};
use crate::integrations::ContentSummary;

// ============================================================================
// PROGRESS DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeProgressDto {
    pub content_id: u64,
    pub episode_id: String,
    pub progress_percent: u8,
    pub completed: bool,
    pub in_progress: bool,
    pub last_watched_at: String,
}

impl EpisodeProgressDto {
    pub fn new(content_id: u64, episode_id: &str, progress: &EpisodeProgress) -> Self {
        Self {
            content_id,
            episode_id: episode_id.to_string(),
            progress_percent: progress.progress_percent,
            completed: progress.completed,
            in_progress: progress.is_in_progress(),
            last_watched_at: progress.last_watched_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// RESUME DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumePointDto {
    pub episode_id: String,
    pub episode_ordinal: u32,
    pub start_time_seconds: u64,
    pub is_next_unwatched: bool,
}

impl From<ResumePoint> for ResumePointDto {
    fn from(point: ResumePoint) -> Self {
        Self {
            episode_id: point.episode.id.to_string(),
            episode_ordinal: point.episode.ordinal,
            start_time_seconds: point.start_time_seconds,
            is_next_unwatched: point.is_next_unwatched,
        }
    }
}

// ============================================================================
// RECENTLY WATCHED DTOs
// ============================================================================

/// One entry of the "recently watched" row. Without a content service
/// only the ID is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentlyWatchedDto {
    pub content_id: u64,
    pub title: Option<String>,
    pub poster_url: Option<String>,
}

impl From<ContentSummary> for RecentlyWatchedDto {
    fn from(summary: ContentSummary) -> Self {
        Self {
            content_id: summary.id.0,
            title: Some(summary.title),
            poster_url: summary.poster_url,
        }
    }
}
