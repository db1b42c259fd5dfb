// events/types.rs
//
// All playback events in the system.
// Each event represents an immutable fact that has already occurred.
//
// CRITICAL RULES:
// - Events are facts, not commands
// - Events carry only the data needed to react
// - No business logic in event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ContentId, EpisodeId, Quality, SegmentKind};
use crate::error::PlaybackError;

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

// ============================================================================
// SESSION LIFECYCLE EVENTS
// ============================================================================

/// Emitted when a source finishes loading and playback can begin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackStarted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub content_id: ContentId,
    pub episode_id: EpisodeId,
    pub quality: Option<Quality>,
    pub start_time_seconds: f64,
}

impl PlaybackStarted {
    pub fn new(
        content_id: ContentId,
        episode_id: EpisodeId,
        quality: Option<Quality>,
        start_time_seconds: f64,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            content_id,
            episode_id,
            quality,
            start_time_seconds,
        }
    }
}

impl DomainEvent for PlaybackStarted {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "PlaybackStarted" }
}

/// Emitted when the player is closed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackStopped {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub content_id: ContentId,
    pub episode_id: EpisodeId,
    pub position_seconds: f64,
}

impl PlaybackStopped {
    pub fn new(content_id: ContentId, episode_id: EpisodeId, position_seconds: f64) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            content_id,
            episode_id,
            position_seconds,
        }
    }
}

impl DomainEvent for PlaybackStopped {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "PlaybackStopped" }
}

/// Emitted when playback reaches a terminal error
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackFailed {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub episode_id: EpisodeId,
    pub error: PlaybackError,
}

impl PlaybackFailed {
    pub fn new(episode_id: EpisodeId, error: PlaybackError) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            episode_id,
            error,
        }
    }
}

impl DomainEvent for PlaybackFailed {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "PlaybackFailed" }
}

// ============================================================================
// PROGRESS EVENTS
// ============================================================================

/// Emitted after progress for an episode was written to the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackProgressUpdated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub content_id: ContentId,
    pub episode_id: EpisodeId,
    pub progress_percent: u8,
    pub position_seconds: f64,
}

impl PlaybackProgressUpdated {
    pub fn new(
        content_id: ContentId,
        episode_id: EpisodeId,
        progress_percent: u8,
        position_seconds: f64,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            content_id,
            episode_id,
            progress_percent,
            position_seconds,
        }
    }
}

impl DomainEvent for PlaybackProgressUpdated {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "PlaybackProgressUpdated" }
}

/// Emitted once per session when an episode crosses the completion threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeCompleted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub content_id: ContentId,
    pub episode_id: EpisodeId,
}

impl EpisodeCompleted {
    pub fn new(content_id: ContentId, episode_id: EpisodeId) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            content_id,
            episode_id,
        }
    }
}

impl DomainEvent for EpisodeCompleted {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "EpisodeCompleted" }
}

// ============================================================================
// PLAYER CONTROL EVENTS
// ============================================================================

/// Emitted when a quality switch has been applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub episode_id: EpisodeId,
    pub from: Option<Quality>,
    pub to: Quality,
    pub position_seconds: f64,
}

impl QualityChanged {
    pub fn new(
        episode_id: EpisodeId,
        from: Option<Quality>,
        to: Quality,
        position_seconds: f64,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            episode_id,
            from,
            to,
            position_seconds,
        }
    }
}

impl DomainEvent for QualityChanged {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "QualityChanged" }
}

/// Emitted when an opening or ending is skipped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentSkipped {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub episode_id: EpisodeId,
    pub kind: SegmentKind,
    /// true when the countdown expired, false for a user skip
    pub automatic: bool,
    pub landed_at_seconds: f64,
}

impl SegmentSkipped {
    pub fn new(
        episode_id: EpisodeId,
        kind: SegmentKind,
        automatic: bool,
        landed_at_seconds: f64,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            episode_id,
            kind,
            automatic,
            landed_at_seconds,
        }
    }
}

impl DomainEvent for SegmentSkipped {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "SegmentSkipped" }
}

/// Emitted when the session moves to another episode.
///
/// The tracking-service sync path subscribes to this and acts only when
/// `sync_history` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeSwitched {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub content_id: ContentId,
    pub from: EpisodeId,
    pub to: EpisodeId,
    pub to_ordinal: u32,
    pub sync_history: bool,
}

impl EpisodeSwitched {
    pub fn new(
        content_id: ContentId,
        from: EpisodeId,
        to: EpisodeId,
        to_ordinal: u32,
        sync_history: bool,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            content_id,
            from,
            to,
            to_ordinal,
            sync_history,
        }
    }
}

impl DomainEvent for EpisodeSwitched {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "EpisodeSwitched" }
}
