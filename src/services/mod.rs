// src/services/mod.rs
//
// Services Module - Orchestration Layer
//
// CRITICAL RULES:
// - Services own business rules, repositories only store
// - Services talk to each other through Arc handles and events
// - Time is read from the injected Clock, never from the system

pub mod playback_ui;
pub mod progress_store;
pub mod resume_resolver;
pub mod segment_skip;
pub mod settings_service;
pub mod streaming;
pub mod timers;

pub use playback_ui::{
    intent_for_key, HoverPreview, Key, PlaybackUiController, PlayerIntent, UiEffect, UiSnapshot,
};

pub use progress_store::ProgressStore;

pub use resume_resolver::ResumeResolver;

pub use segment_skip::{SegmentSkipDetector, SkipJump, SkipState, SkipTransition};

pub use settings_service::SettingsService;

pub use streaming::{
    EngineEvent, EngineFactory, ErrorKind, MediaElement, MediaError, MediaEvent,
    PendingOperation, PlaybackSnapshot, PlayerServices, SessionRequest, SessionState,
    SkipSnapshot, StreamingEngine, StreamingSessionController,
};

pub use timers::TimerQueue;
