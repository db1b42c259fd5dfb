// src/lib.rs
// AniStream - HLS playback core with resume and watch-progress tracking
//
// Architecture:
// - Domain-centric: episodes, watch history and settings are plain values
// - Event-driven: the player reports through the event bus, never to the UI directly
// - Explicit: every timer runs off an injected Clock and is advanced by tick()
// - Local-first: progress lives in a key-value store owned by the user
// - Application Layer: commands and error panels for the UI host

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod repositories;
pub mod runtime;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;
pub mod integrations;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    validate_episode,
    // Watch history
    ContentId,
    // Episodes
    Episode,
    EpisodeId,
    EpisodeProgress,
    // Settings
    PlayerSettings,
    Quality,
    // Resume
    ResumePoint,
    SegmentKind,
    SegmentRange,
    WatchHistory,
};

// ============================================================================
// PUBLIC API - Errors and configuration
// ============================================================================

pub use config::{EngineConfig, PlayerConfig};
pub use error::{AppError, AppResult, PlaybackError};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus,
    DomainEvent,
    EpisodeCompleted,
    EpisodeSwitched,
    EventBus,
    EventLogEntry,
    PlaybackFailed,
    PlaybackProgressUpdated,
    PlaybackStarted,
    PlaybackStopped,
    QualityChanged,
    SegmentSkipped,
};

// ============================================================================
// PUBLIC API - Storage
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool};

pub use repositories::{
    InMemoryKeyValueStore, KeyValueStore, SettingsRepository, SqliteKeyValueStore,
    WatchHistoryRepository,
};

// ============================================================================
// PUBLIC API - Services and runtime
// ============================================================================

pub use services::{
    // Playback UI
    Key,
    MediaElement,
    PlaybackUiController,
    PlayerIntent,
    // Progress
    ProgressStore,
    ResumeResolver,
    // Skip detection
    SegmentSkipDetector,
    SessionRequest,
    SessionState,
    SettingsService,
    // Streaming session
    EngineEvent,
    EngineFactory,
    MediaEvent,
    StreamingEngine,
    StreamingSessionController,
    UiEffect,
};

pub use runtime::{Clock, ManualClock, PlayerHandle, PlayerRuntime, SystemClock};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::AppState;

pub use application::commands;
pub use application::dto;

pub use integrations::{ContentFetcher, ContentSummary, HttpContentClient};
