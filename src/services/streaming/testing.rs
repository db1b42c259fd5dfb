// src/services/streaming/testing.rs
//
// In-memory media element and engine used by the player tests

use chrono::Utc;
use std::sync::{Arc, Mutex};

use crate::config::EngineConfig;
use crate::domain::{ContentId, Episode, EpisodeId, Quality};
use crate::events::EventBus;
use crate::repositories::{InMemoryKeyValueStore, KvWatchHistoryRepository};
use crate::runtime::clock::ManualClock;
use crate::services::progress_store::ProgressStore;

use super::controller::{PlayerServices, SessionRequest};
use super::engine::{EngineFactory, MediaElement, MediaError, StreamingEngine};

#[derive(Debug)]
pub struct MediaState {
    pub current_time: f64,
    pub duration: Option<f64>,
    pub buffered_end: Option<f64>,
    pub paused: bool,
    pub volume: f64,
    pub muted: bool,
    pub native_hls: bool,
    pub native_source: Option<String>,
    /// Number of upcoming seeks the element silently drops
    pub ignore_seeks: u32,
    pub reject_play: bool,
    pub seek_writes: Vec<f64>,
}

impl Default for MediaState {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: None,
            buffered_end: None,
            paused: true,
            volume: 1.0,
            muted: false,
            native_hls: false,
            native_source: None,
            ignore_seeks: 0,
            reject_play: false,
            seek_writes: Vec::new(),
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeMedia {
    pub state: Arc<Mutex<MediaState>>,
}

impl FakeMedia {
    pub fn with<R>(&self, f: impl FnOnce(&mut MediaState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn set_time(&self, seconds: f64) {
        self.with(|s| s.current_time = seconds);
    }

    pub fn time(&self) -> f64 {
        self.with(|s| s.current_time)
    }
}

impl MediaElement for FakeMedia {
    fn current_time(&self) -> f64 {
        self.with(|s| s.current_time)
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.with(|s| {
            s.seek_writes.push(seconds);
            if s.ignore_seeks > 0 {
                s.ignore_seeks -= 1;
            } else {
                s.current_time = seconds;
            }
        });
    }

    fn duration(&self) -> Option<f64> {
        self.with(|s| s.duration)
    }

    fn buffered_end(&self) -> Option<f64> {
        self.with(|s| s.buffered_end)
    }

    fn is_paused(&self) -> bool {
        self.with(|s| s.paused)
    }

    fn play(&mut self) -> Result<(), MediaError> {
        self.with(|s| {
            if s.reject_play {
                Err(MediaError::PlayRejected("autoplay blocked".to_string()))
            } else {
                s.paused = false;
                Ok(())
            }
        })
    }

    fn pause(&mut self) {
        self.with(|s| s.paused = true);
    }

    fn volume(&self) -> f64 {
        self.with(|s| s.volume)
    }

    fn set_volume(&mut self, volume: f64) {
        self.with(|s| s.volume = volume);
    }

    fn is_muted(&self) -> bool {
        self.with(|s| s.muted)
    }

    fn set_muted(&mut self, muted: bool) {
        self.with(|s| s.muted = muted);
    }

    fn supports_native_hls(&self) -> bool {
        self.with(|s| s.native_hls)
    }

    fn set_native_source(&mut self, url: &str) {
        self.with(|s| s.native_source = Some(url.to_string()));
    }

    fn clear_source(&mut self) {
        self.with(|s| s.native_source = None);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Attach,
    Load(String),
    StartLoad,
    RecoverMedia,
    Destroy,
}

#[derive(Debug, Default)]
pub struct EngineLog {
    pub created: Vec<u64>,
    pub calls: Vec<(u64, EngineCall)>,
}

struct FakeEngine {
    generation: u64,
    log: Arc<Mutex<EngineLog>>,
}

impl FakeEngine {
    fn record(&self, call: EngineCall) {
        self.log.lock().unwrap().calls.push((self.generation, call));
    }
}

impl StreamingEngine for FakeEngine {
    fn attach_media(&mut self) {
        self.record(EngineCall::Attach);
    }

    fn load_source(&mut self, url: &str) {
        self.record(EngineCall::Load(url.to_string()));
    }

    fn start_load(&mut self) {
        self.record(EngineCall::StartLoad);
    }

    fn recover_media_error(&mut self) {
        self.record(EngineCall::RecoverMedia);
    }

    fn destroy(&mut self) {
        self.record(EngineCall::Destroy);
    }
}

pub struct FakeEngineFactory {
    pub supported: bool,
    pub log: Arc<Mutex<EngineLog>>,
}

impl FakeEngineFactory {
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            log: Arc::new(Mutex::new(EngineLog::default())),
        }
    }

    pub fn created(&self) -> Vec<u64> {
        self.log.lock().unwrap().created.clone()
    }

    pub fn calls(&self, generation: u64) -> Vec<EngineCall> {
        self.log
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(g, _)| *g == generation)
            .map(|(_, call)| call.clone())
            .collect()
    }
}

impl EngineFactory for FakeEngineFactory {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&self, generation: u64, _config: &EngineConfig) -> Box<dyn StreamingEngine> {
        self.log.lock().unwrap().created.push(generation);
        Box::new(FakeEngine {
            generation,
            log: self.log.clone(),
        })
    }
}

/// Everything a player test needs, wired against in-memory storage
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub store: Arc<ProgressStore>,
    pub events: Arc<EventBus>,
    pub engines: Arc<FakeEngineFactory>,
    pub media: FakeMedia,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_engine_support(true)
    }

    pub fn with_engine_support(supported: bool) -> Self {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let repo = Arc::new(KvWatchHistoryRepository::new(Arc::new(
            InMemoryKeyValueStore::new(),
        )));
        Self {
            store: Arc::new(ProgressStore::new(repo, clock.clone())),
            clock,
            events: Arc::new(EventBus::new()),
            engines: Arc::new(FakeEngineFactory::new(supported)),
            media: FakeMedia::default(),
        }
    }

    pub fn services(&self) -> PlayerServices {
        PlayerServices {
            store: self.store.clone(),
            events: self.events.clone(),
            clock: self.clock.clone(),
            engines: self.engines.clone(),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.clock.advance_ms(ms);
    }

    pub fn event_count(&self, event_type: &str) -> usize {
        self.events
            .get_event_log()
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }
}

pub fn episode(id: &str, ordinal: u32, duration: f64) -> Episode {
    Episode::new(id, ordinal, duration)
        .with_variant(Quality::P1080, format!("https://cdn.test/{}/1080.m3u8", id))
        .with_variant(Quality::P720, format!("https://cdn.test/{}/720.m3u8", id))
        .with_variant(Quality::P480, format!("https://cdn.test/{}/480.m3u8", id))
}

pub fn request(episodes: Vec<Episode>, episode_id: &str) -> SessionRequest {
    SessionRequest {
        content_id: ContentId(7),
        episodes,
        episode_id: EpisodeId::new(episode_id),
        start_time: None,
        autoplay: true,
    }
}
