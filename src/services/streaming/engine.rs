// src/services/streaming/engine.rs
//
// Seams to the media element and the adaptive streaming engine
//
// CRITICAL RULES:
// - The controller owns at most one engine instance at a time
// - Every engine is created with a generation number; events it reports
//   carry that number so events from a destroyed instance can be dropped
// - Nothing here blocks: the host delivers events, the controller reacts

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EngineConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// The platform refused to start playback (autoplay policy and similar)
    #[error("play request rejected: {0}")]
    PlayRejected(String),
}

/// The video element the engine renders into.
///
/// Position and duration are in seconds.
pub trait MediaElement: Send {
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);

    /// `None` until metadata is loaded
    fn duration(&self) -> Option<f64>;

    /// End of the buffered range containing the playhead
    fn buffered_end(&self) -> Option<f64>;

    fn is_paused(&self) -> bool;
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);

    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);
    fn is_muted(&self) -> bool;
    fn set_muted(&mut self, muted: bool);

    /// Whether the element can play HLS manifests without an engine
    fn supports_native_hls(&self) -> bool;
    fn set_native_source(&mut self, url: &str);
    fn clear_source(&mut self);
}

/// One adaptive streaming engine instance bound to the media element
pub trait StreamingEngine: Send {
    fn attach_media(&mut self);
    fn load_source(&mut self, url: &str);

    /// Resume fetching after a network error
    fn start_load(&mut self);

    /// Let the engine try to recover a decoding error in place
    fn recover_media_error(&mut self);

    fn destroy(&mut self);
}

pub trait EngineFactory: Send + Sync {
    /// `false` when the environment cannot run the engine at all
    fn is_supported(&self) -> bool;

    fn create(&self, generation: u64, config: &EngineConfig) -> Box<dyn StreamingEngine>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Media,
    Other,
}

/// Reported by an engine instance
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ManifestParsed { levels: usize },
    Error {
        kind: ErrorKind,
        details: String,
        fatal: bool,
    },
    BufferStalled,
}

/// Reported by the media element
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    LoadedMetadata,
    TimeUpdate,
    Progress,
    Playing,
    Pause,
    Waiting,
    CanPlay,
    Seeked,
    Ended,
    Error(String),
}
