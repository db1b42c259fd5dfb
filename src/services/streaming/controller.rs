// src/services/streaming/controller.rs
//
// Streaming Session Controller
//
// Owns the engine instance, the media element and every timer of one
// playback session.
//
// CRITICAL RULES:
// - At most one quality or episode change in flight; others are dropped
// - Events from an engine generation other than the current one are ignored
// - Progress is written only once the session covered enough of the episode
// - Time only moves when the host calls `tick`

use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::Arc;

use crate::config::PlayerConfig;
use crate::domain::{
    validate_episode, ContentId, DomainError, Episode, EpisodeId, PlayerSettings, Quality,
};
use crate::error::{AppError, AppResult, PlaybackError};
use crate::events::{
    EpisodeCompleted, EpisodeSwitched, EventBus, PlaybackFailed, PlaybackProgressUpdated,
    PlaybackStarted, PlaybackStopped, QualityChanged, SegmentSkipped,
};
use crate::runtime::clock::Clock;
use crate::services::progress_store::ProgressStore;
use crate::services::resume_resolver;
use crate::services::segment_skip::{SegmentSkipDetector, SkipJump, SkipState, SkipTransition};
use crate::services::timers::TimerQueue;

use super::engine::{
    EngineEvent, EngineFactory, ErrorKind, MediaElement, MediaEvent, StreamingEngine,
};
use super::recovery::{RecoveryAction, RecoveryTracker};
use super::seek::{SeekCheck, SeekCoordinator};
use super::state::SessionState;

/// What to play
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub content_id: ContentId,
    pub episodes: Vec<Episode>,
    pub episode_id: EpisodeId,
    /// Explicit start position; saved progress is used when absent
    pub start_time: Option<f64>,
    pub autoplay: bool,
}

/// Shared collaborators of a session
#[derive(Clone)]
pub struct PlayerServices {
    pub store: Arc<ProgressStore>,
    pub events: Arc<EventBus>,
    pub clock: Arc<dyn Clock>,
    pub engines: Arc<dyn EngineFactory>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum PendingOperation {
    QualityChange { from: Option<Quality>, to: Quality },
    EpisodeSwitch { to: EpisodeId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum SessionTimer {
    SeekVerify,
    ProgressSave,
    OperationTimeout,
}

#[derive(Debug, Clone)]
struct ActiveSource {
    url: String,
    /// Applied once the source reports ready
    resume_at: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipSnapshot {
    pub state: SkipState,
    pub auto_skip_armed: bool,
    pub progress_percent: u8,
}

/// Read model for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub state: SessionState,
    pub content_id: ContentId,
    pub current_episode: EpisodeId,
    pub next_episode: Option<EpisodeId>,
    pub current_quality: Option<Quality>,
    pub available_qualities: Vec<Quality>,
    pub is_playing: bool,
    pub is_loading: bool,
    pub current_time: f64,
    pub duration: f64,
    pub buffered_percent: f64,
    pub volume: f64,
    pub muted: bool,
    pub seek_target: Option<f64>,
    pub skip: SkipSnapshot,
    pub pending_operation: Option<PendingOperation>,
}

pub struct StreamingSessionController<M: MediaElement> {
    config: PlayerConfig,
    settings: PlayerSettings,
    services: PlayerServices,

    media: M,
    engine: Option<Box<dyn StreamingEngine>>,
    generation: u64,
    native: bool,
    source: Option<ActiveSource>,
    state: SessionState,

    content_id: ContentId,
    episodes: Vec<Episode>,
    current: usize,
    quality: Option<Quality>,
    initial_start: Option<f64>,
    autoplay: bool,

    play_intent: bool,
    loading: bool,
    buffered_percent: f64,
    last_position: f64,
    session_start: Option<f64>,
    completion_emitted: bool,
    pending: Option<PendingOperation>,
    /// Position at the last reinitialization, until playback moves past it
    recovering_from: Option<f64>,

    timers: TimerQueue<SessionTimer>,
    seek: SeekCoordinator,
    recovery: RecoveryTracker,
    skip: SegmentSkipDetector,
}

impl<M: MediaElement> StreamingSessionController<M> {
    pub fn new(
        request: SessionRequest,
        media: M,
        services: PlayerServices,
        config: PlayerConfig,
        settings: PlayerSettings,
    ) -> AppResult<Self> {
        let mut episodes = request.episodes;
        if episodes.is_empty() {
            return Err(DomainError::InvariantViolation(
                "a session needs at least one episode".to_string(),
            )
            .into());
        }
        for episode in &episodes {
            validate_episode(episode)?;
        }
        episodes.sort_by_key(|e| e.ordinal);

        let current = episodes
            .iter()
            .position(|e| e.id == request.episode_id)
            .ok_or_else(|| DomainError::NotFound(format!("episode {}", request.episode_id)))?;

        let mut skip = SegmentSkipDetector::new(
            config.skip_countdown_ms,
            config.skip_offset_seconds,
            settings.auto_skip,
        );
        skip.reset(episodes[current].opening_range, episodes[current].ending_range);

        Ok(Self {
            seek: SeekCoordinator::new(config.seek_max_retries, config.seek_tolerance_seconds),
            recovery: RecoveryTracker::new(
                config.max_reinit_attempts,
                config.max_network_recoveries,
            ),
            skip,
            timers: TimerQueue::new(),
            config,
            settings,
            services,
            media,
            engine: None,
            generation: 0,
            native: false,
            source: None,
            state: SessionState::Uninitialized,
            content_id: request.content_id,
            episodes,
            current,
            quality: None,
            initial_start: request.start_time,
            autoplay: request.autoplay,
            play_intent: false,
            loading: false,
            buffered_percent: 0.0,
            last_position: 0.0,
            session_start: None,
            completion_emitted: false,
            pending: None,
            recovering_from: None,
        })
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Attach the first source. Calling it again is a no-op.
    pub fn open(&mut self) -> AppResult<()> {
        if self.state != SessionState::Uninitialized {
            return Ok(());
        }

        self.media.set_volume(self.settings.clamped_volume());
        self.media.set_muted(self.settings.muted);
        self.play_intent = self.autoplay;

        let start = match self.initial_start.take() {
            Some(start) => start.max(0.0),
            None => self.resume_offset(),
        };
        info!(
            "opening content {} episode {} at {:.1}s",
            self.content_id,
            self.episode().id,
            start
        );
        self.start_episode(start)
    }

    /// Load an arbitrary source URL into the session
    pub fn load_source(&mut self, url: &str, resume_at: Option<f64>) -> AppResult<()> {
        if self.state.is_terminal() {
            return Err(DomainError::InvalidStateTransition(format!(
                "cannot load a source in state {}",
                self.state.label()
            ))
            .into());
        }
        self.reset_recovery();
        self.attach(url.to_string(), resume_at)
    }

    /// Stop timers, tear the engine down and write final progress
    pub fn close(&mut self) {
        if self.state == SessionState::Destroyed {
            return;
        }

        let position = self.position();
        self.timers.clear();
        self.skip.cancel_countdown();
        self.pending = None;
        self.teardown_engine();

        if !matches!(self.state, SessionState::Error { .. }) {
            self.flush_progress_at(position);
        }

        self.transition(SessionState::Destroyed);
        info!(
            "closed session for content {} at {:.1}s",
            self.content_id, position
        );
        self.services.events.emit(PlaybackStopped::new(
            self.content_id,
            self.episode().id.clone(),
            position,
        ));
    }

    /// Fire every timer that is due
    pub fn tick(&mut self) {
        let now = self.now_ms();
        for timer in self.timers.drain_due(now) {
            match timer {
                SessionTimer::SeekVerify => self.verify_seek(),
                SessionTimer::ProgressSave => {
                    self.flush_progress();
                    if !self.state.is_terminal() {
                        self.timers.schedule(
                            SessionTimer::ProgressSave,
                            now,
                            self.config.progress_save_interval_ms,
                        );
                    }
                }
                SessionTimer::OperationTimeout => {
                    if let Some(operation) = self.pending.take() {
                        warn!("{:?} did not finish in time, releasing", operation);
                    }
                    self.loading = false;
                }
            }
        }

        if self.state.is_ready() {
            if let Some(jump) = self.skip.poll(now) {
                self.apply_skip(jump);
            }
        }
    }

    // ========================================================================
    // EVENTS FROM THE HOST
    // ========================================================================

    pub fn handle_engine_event(&mut self, generation: u64, event: EngineEvent) {
        if generation != self.generation || self.engine.is_none() {
            debug!(
                "dropping {:?} from engine generation {} (current {})",
                event, generation, self.generation
            );
            return;
        }

        match event {
            EngineEvent::ManifestParsed { levels } => {
                debug!("manifest parsed with {} levels", levels);
                self.on_source_ready();
            }
            EngineEvent::Error {
                kind,
                details,
                fatal,
            } => self.on_engine_error(kind, details, fatal),
            EngineEvent::BufferStalled => self.loading = true,
        }
    }

    pub fn handle_media_event(&mut self, event: MediaEvent) {
        if self.state.is_terminal() {
            return;
        }

        match event {
            MediaEvent::LoadedMetadata => {
                if self.native {
                    self.on_source_ready();
                }
            }
            MediaEvent::TimeUpdate => self.on_time_update(),
            MediaEvent::Progress => self.update_buffered(),
            // Play/pause from outside the player (media keys, OS controls)
            // becomes the session's intent. While a source is loading the
            // element reports its own teardown, which must not count.
            MediaEvent::Playing => {
                self.loading = false;
                if self.state.is_ready() {
                    self.play_intent = true;
                    self.transition(SessionState::Playing);
                }
            }
            MediaEvent::Pause => {
                if self.state.is_ready() {
                    self.play_intent = false;
                    if self.state == SessionState::Playing {
                        self.transition(SessionState::Paused);
                    }
                }
            }
            MediaEvent::Waiting => self.loading = true,
            MediaEvent::CanPlay => {
                if self.state.is_ready() {
                    self.loading = false;
                }
            }
            MediaEvent::Seeked => {
                if self.state.is_ready() {
                    let time = self.position();
                    let now = self.now_ms();
                    let transitions = self.skip.reevaluate(time, now);
                    log_skip_transitions(&transitions);
                }
            }
            MediaEvent::Ended => self.on_ended(),
            MediaEvent::Error(details) => {
                if self.native {
                    self.on_engine_error(ErrorKind::Other, details, true);
                } else {
                    debug!("media element error while engine attached: {}", details);
                }
            }
        }
    }

    // ========================================================================
    // USER CONTROLS
    // ========================================================================

    pub fn play(&mut self) {
        self.play_intent = true;
        if self.state.is_ready() {
            self.start_playback();
        }
    }

    pub fn pause(&mut self) {
        self.play_intent = false;
        if self.state.is_ready() {
            self.media.pause();
            if self.state == SessionState::Playing {
                self.transition(SessionState::Paused);
            }
        }
    }

    pub fn toggle_play(&mut self) {
        if self.play_intent {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Seek to `target` seconds. While a source is still loading the target
    /// replaces the pending start position.
    pub fn seek(&mut self, target: f64) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        let target = self.clamp_position(target);

        if self.state.is_loading() {
            if let Some(source) = self.source.as_mut() {
                source.resume_at = Some(target);
                return true;
            }
            return false;
        }
        if !self.state.is_ready() {
            return false;
        }

        self.seek_to(target);
        let now = self.now_ms();
        let transitions = self.skip.reevaluate(target, now);
        log_skip_transitions(&transitions);
        true
    }

    pub fn seek_relative(&mut self, delta: f64) -> bool {
        let target = self.position() + delta;
        self.seek(target)
    }

    pub fn set_volume(&mut self, volume: f64) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.media.set_volume(volume);
        if volume > 0.0 && self.media.is_muted() {
            self.media.set_muted(false);
        }
        self.settings.volume = volume;
        self.settings.muted = self.media.is_muted();
    }

    pub fn toggle_mute(&mut self) {
        let muted = !self.media.is_muted();
        self.media.set_muted(muted);
        self.settings.muted = muted;
    }

    pub fn set_auto_skip(&mut self, enabled: bool) {
        self.settings.auto_skip = enabled;
        let now = self.now_ms();
        self.skip.set_auto_skip(enabled, now);
    }

    /// Skip the segment currently prompted
    pub fn skip_segment(&mut self) -> bool {
        if !self.state.is_ready() {
            return false;
        }
        match self.skip.skip() {
            Some(jump) => {
                self.apply_skip(jump);
                true
            }
            None => false,
        }
    }

    pub fn dismiss_skip(&mut self) {
        self.skip.dismiss();
    }

    /// Switch stream quality, keeping position and play/pause state.
    ///
    /// `Ok(false)` when the request was a no-op or dropped because another
    /// change is in flight.
    pub fn change_quality(&mut self, quality: Quality) -> AppResult<bool> {
        if !self.is_open() || self.quality == Some(quality) {
            return Ok(false);
        }
        let url = self
            .episode()
            .stream_url(quality)
            .map(str::to_string)
            .ok_or(DomainError::QualityUnavailable(quality))?;

        if let Some(operation) = &self.pending {
            info!("quality change to {} dropped, {:?} in flight", quality, operation);
            return Ok(false);
        }

        let position = self.position();
        let from = self.quality;
        info!(
            "changing quality {:?} -> {} at {:.1}s",
            from, quality, position
        );

        self.begin_operation(PendingOperation::QualityChange { from, to: quality });
        self.quality = Some(quality);
        self.reset_recovery();
        self.attach(url, Some(position))?;
        Ok(true)
    }

    /// Move the session to another episode of the same content
    pub fn switch_episode(&mut self, episode_id: &EpisodeId) -> AppResult<bool> {
        if !self.is_open() {
            return Ok(false);
        }
        let index = self
            .episodes
            .iter()
            .position(|e| &e.id == episode_id)
            .ok_or_else(|| DomainError::NotFound(format!("episode {}", episode_id)))?;
        if index == self.current {
            return Ok(false);
        }
        if let Some(operation) = &self.pending {
            info!(
                "switch to episode {} dropped, {:?} in flight",
                episode_id, operation
            );
            return Ok(false);
        }

        self.flush_progress();

        let from = self.episode().id.clone();
        self.current = index;
        self.reset_episode_state();

        let (to, ordinal) = {
            let episode = self.episode();
            (episode.id.clone(), episode.ordinal)
        };
        info!("switching episode {} -> {}", from, to);

        self.begin_operation(PendingOperation::EpisodeSwitch { to: to.clone() });
        self.services.events.emit(EpisodeSwitched::new(
            self.content_id,
            from,
            to,
            ordinal,
            self.settings.sync_history,
        ));

        let start = self.resume_offset();
        self.start_episode(start)?;
        Ok(true)
    }

    pub fn next_episode(&mut self) -> AppResult<bool> {
        match self.next_episode_id() {
            Some(next) => self.switch_episode(&next),
            None => Ok(false),
        }
    }

    // ========================================================================
    // READ MODEL
    // ========================================================================

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn content_id(&self) -> ContentId {
        self.content_id
    }

    pub fn episode(&self) -> &Episode {
        &self.episodes[self.current]
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    pub fn quality(&self) -> Option<Quality> {
        self.quality
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn pending_operation(&self) -> Option<&PendingOperation> {
        self.pending.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn next_episode_id(&self) -> Option<EpisodeId> {
        self.episodes.get(self.current + 1).map(|e| e.id.clone())
    }

    /// Position to display. While loading this is where playback will resume.
    pub fn position(&self) -> f64 {
        if self.state.is_loading() {
            return self
                .source
                .as_ref()
                .and_then(|s| s.resume_at)
                .unwrap_or(self.last_position);
        }
        self.seek.display_time(self.media.current_time())
    }

    pub fn duration(&self) -> f64 {
        self.media
            .duration()
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(self.episode().duration_seconds)
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let now = self.now_ms();
        PlaybackSnapshot {
            state: self.state.clone(),
            content_id: self.content_id,
            current_episode: self.episode().id.clone(),
            next_episode: self.next_episode_id(),
            current_quality: self.quality,
            available_qualities: self.episode().quality_variants.available(),
            is_playing: self.state == SessionState::Playing,
            is_loading: self.loading,
            current_time: self.position(),
            duration: self.duration(),
            buffered_percent: self.buffered_percent,
            volume: self.media.volume(),
            muted: self.media.is_muted(),
            seek_target: self.seek.target(),
            skip: SkipSnapshot {
                state: self.skip.state(),
                auto_skip_armed: self.skip.is_armed(),
                progress_percent: self.skip.skip_progress_percent(now),
            },
            pending_operation: self.pending.clone(),
        }
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    /// Opened and not yet finished
    fn is_open(&self) -> bool {
        self.state != SessionState::Uninitialized && !self.state.is_terminal()
    }

    fn now_ms(&self) -> u64 {
        self.services.clock.monotonic_ms()
    }

    fn transition(&mut self, next: SessionState) {
        if self.state == next {
            return;
        }
        if !self.state.can_transition_to(&next) {
            warn!(
                "ignoring transition {} -> {}",
                self.state.label(),
                next.label()
            );
            return;
        }
        debug!("session {} -> {}", self.state.label(), next.label());
        self.state = next;
    }

    fn resume_offset(&self) -> f64 {
        let episode = self.episode();
        let saved = self.services.store.get(self.content_id, &episode.id);
        resume_resolver::start_offset(episode, saved.as_ref())
    }

    fn start_episode(&mut self, start: f64) -> AppResult<()> {
        let (episode_id, source) = {
            let episode = self.episode();
            let source = episode
                .preferred_quality()
                .and_then(|q| episode.stream_url(q).map(|url| (q, url.to_string())));
            (episode.id.clone(), source)
        };

        let Some((quality, url)) = source else {
            let error = PlaybackError::SourceUnavailable {
                episode_id: episode_id.to_string(),
            };
            self.fail(error.clone());
            return Err(error.into());
        };

        self.quality = Some(quality);
        self.attach(url, Some(start))
    }

    /// Replace whatever is attached with a fresh engine on `url`
    fn attach(&mut self, url: String, resume_at: Option<f64>) -> AppResult<()> {
        self.teardown_engine();
        self.seek.reset();
        self.timers.cancel(SessionTimer::SeekVerify);
        self.transition(SessionState::Attaching);
        self.loading = true;
        self.source = Some(ActiveSource {
            url: url.clone(),
            resume_at,
        });
        self.generation += 1;

        if self.services.engines.is_supported() {
            let mut engine = self
                .services
                .engines
                .create(self.generation, &self.config.engine);
            engine.attach_media();
            engine.load_source(&url);
            self.engine = Some(engine);
            debug!("engine generation {} loading {}", self.generation, url);
        } else if self.media.supports_native_hls() {
            info!("adaptive engine unavailable, using native playback");
            self.media.set_native_source(&url);
            self.native = true;
        } else {
            self.fail(PlaybackError::Unsupported);
            return Err(AppError::Playback(PlaybackError::Unsupported));
        }

        self.transition(SessionState::Loading);

        if !self.timers.is_scheduled(SessionTimer::ProgressSave) {
            let now = self.now_ms();
            self.timers.schedule(
                SessionTimer::ProgressSave,
                now,
                self.config.progress_save_interval_ms,
            );
        }
        Ok(())
    }

    fn teardown_engine(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
        if self.native {
            self.media.clear_source();
            self.native = false;
        }
    }

    fn on_source_ready(&mut self) {
        if self.state != SessionState::Loading {
            return;
        }
        self.transition(SessionState::Ready);
        self.loading = false;

        let resume_at = self
            .source
            .as_ref()
            .and_then(|s| s.resume_at)
            .filter(|t| *t > 0.0);
        if let Some(target) = resume_at {
            self.seek_to(target);
        }
        if self.session_start.is_none() {
            self.session_start = Some(resume_at.unwrap_or(0.0));
        }

        if self.play_intent {
            self.start_playback();
        } else {
            self.transition(SessionState::Paused);
        }

        self.services.events.emit(PlaybackStarted::new(
            self.content_id,
            self.episode().id.clone(),
            self.quality,
            resume_at.unwrap_or(0.0),
        ));
        self.try_complete_operation();
    }

    fn start_playback(&mut self) {
        match self.media.play() {
            Ok(()) => self.transition(SessionState::Playing),
            Err(e) => {
                warn!("{}", e);
                self.play_intent = false;
                self.transition(SessionState::Paused);
            }
        }
    }

    fn seek_to(&mut self, target: f64) {
        self.media.set_current_time(target);
        self.seek.begin(target);
        let now = self.now_ms();
        self.timers.schedule(
            SessionTimer::SeekVerify,
            now,
            self.config.seek_retry_interval_ms,
        );
    }

    fn verify_seek(&mut self) {
        let current = self.media.current_time();
        match self.seek.verify(current) {
            SeekCheck::Idle => {}
            SeekCheck::Confirmed(target) => {
                debug!("seek to {:.2}s confirmed", target);
                self.try_complete_operation();
            }
            SeekCheck::Retry(target) => {
                self.media.set_current_time(target);
                let now = self.now_ms();
                self.timers.schedule(
                    SessionTimer::SeekVerify,
                    now,
                    self.config.seek_retry_interval_ms,
                );
            }
            SeekCheck::GaveUp(_) => self.try_complete_operation(),
        }
    }

    fn clamp_position(&self, target: f64) -> f64 {
        let target = if target.is_finite() { target } else { 0.0 };
        target.max(0.0).min(self.duration())
    }

    fn begin_operation(&mut self, operation: PendingOperation) {
        self.pending = Some(operation);
        let now = self.now_ms();
        self.timers.schedule(
            SessionTimer::OperationTimeout,
            now,
            self.config.quality_change_timeout_ms,
        );
    }

    /// Release the in-flight slot once the new source is ready and the
    /// resume seek has settled
    fn try_complete_operation(&mut self) {
        if self.seek.is_pending() || !self.state.is_ready() {
            return;
        }
        let Some(operation) = self.pending.take() else {
            return;
        };
        self.timers.cancel(SessionTimer::OperationTimeout);

        match operation {
            PendingOperation::QualityChange { from, to } => {
                let position = self.position();
                info!("quality now {} at {:.1}s", to, position);
                self.services.events.emit(QualityChanged::new(
                    self.episode().id.clone(),
                    from,
                    to,
                    position,
                ));
            }
            PendingOperation::EpisodeSwitch { to } => {
                debug!("episode {} ready", to);
            }
        }
    }

    fn on_time_update(&mut self) {
        let current = self.media.current_time();
        self.seek.observe(current);
        if current > self.last_position {
            self.recovery.on_playback_advanced();
        }
        self.last_position = current;
        self.update_buffered();

        if self.state.is_ready() {
            self.check_recovered(current);
            let time = self.seek.display_time(current);
            let now = self.now_ms();
            let transitions = self.skip.on_time_update(time, now);
            log_skip_transitions(&transitions);
        }
    }

    fn update_buffered(&mut self) {
        let duration = self.duration();
        if let Some(end) = self.media.buffered_end() {
            self.buffered_percent = (end / duration * 100.0).clamp(0.0, 100.0);
        }
    }

    fn apply_skip(&mut self, jump: SkipJump) {
        info!(
            "skipping {} to {:.1}s ({})",
            jump.kind,
            jump.target,
            if jump.automatic { "auto" } else { "user" }
        );
        self.seek(jump.target);
        self.services.events.emit(SegmentSkipped::new(
            self.episode().id.clone(),
            jump.kind,
            jump.automatic,
            jump.target,
        ));
    }

    fn on_ended(&mut self) {
        let duration = self.duration();
        self.flush_progress_at(duration);
        if self.state == SessionState::Playing {
            self.transition(SessionState::Paused);
        }

        if !self.settings.autoplay_next {
            return;
        }
        if let Some(next) = self.next_episode_id() {
            self.play_intent = true;
            if let Err(e) = self.switch_episode(&next) {
                warn!("autoplay of episode {} failed: {}", next, e);
            }
        }
    }

    fn on_engine_error(&mut self, kind: ErrorKind, details: String, fatal: bool) {
        match self.recovery.on_error(kind, fatal) {
            RecoveryAction::Ignore => debug!("non-fatal {:?} error: {}", kind, details),
            RecoveryAction::ResumeLoading => {
                warn!("network error, resuming load: {}", details);
                if let Some(engine) = self.engine.as_mut() {
                    engine.start_load();
                }
            }
            RecoveryAction::RecoverMedia => {
                warn!("media error, attempting in-place recovery: {}", details);
                if let Some(engine) = self.engine.as_mut() {
                    engine.recover_media_error();
                }
            }
            RecoveryAction::Reinitialize { attempt } => {
                warn!(
                    "{:?} error, reinitializing engine (attempt {}/{}): {}",
                    kind, attempt, self.config.max_reinit_attempts, details
                );
                let position = self.position();
                let Some(url) = self.source.as_ref().map(|s| s.url.clone()) else {
                    return;
                };
                self.recovery.on_reinitialized();
                self.recovering_from = Some(position);
                if let Err(e) = self.attach(url, Some(position)) {
                    warn!("reinitialization failed: {}", e);
                }
            }
            RecoveryAction::GiveUp { attempts } => {
                self.fail(PlaybackError::RecoveryExhausted { attempts, details });
            }
        }
    }

    fn reset_recovery(&mut self) {
        self.recovery.reset();
        self.recovering_from = None;
    }

    /// A reinitialized engine counts as recovered once it plays past the
    /// position it was restored to. Landing the resume seek is not enough.
    fn check_recovered(&mut self, current: f64) {
        let Some(from) = self.recovering_from else {
            return;
        };
        if current > from + self.config.seek_tolerance_seconds {
            info!(
                "playback recovered at {:.1}s after {} reinitialization(s)",
                current,
                self.recovery.reinit_attempts()
            );
            self.reset_recovery();
        }
    }

    fn fail(&mut self, error: PlaybackError) {
        error!("playback failed: {}", error);
        let position = self.position();
        self.flush_progress_at(position);

        self.timers.clear();
        self.skip.cancel_countdown();
        self.pending = None;
        self.teardown_engine();
        self.loading = false;

        self.transition(SessionState::Error {
            error: error.clone(),
        });
        self.services
            .events
            .emit(PlaybackFailed::new(self.episode().id.clone(), error));
    }

    fn reset_episode_state(&mut self) {
        self.seek.reset();
        self.timers.cancel(SessionTimer::SeekVerify);
        let (opening, ending) = {
            let episode = self.episode();
            (episode.opening_range, episode.ending_range)
        };
        self.skip.reset(opening, ending);
        self.session_start = None;
        self.completion_emitted = false;
        self.reset_recovery();
        self.last_position = 0.0;
        self.buffered_percent = 0.0;
    }

    fn flush_progress(&mut self) -> bool {
        let position = self.position();
        self.flush_progress_at(position)
    }

    /// Write progress unless the session has covered less than the minimum
    /// share of the episode since it started
    fn flush_progress_at(&mut self, position: f64) -> bool {
        let Some(start) = self.session_start else {
            return false;
        };
        let duration = self.duration();
        if duration <= 0.0 || !position.is_finite() {
            return false;
        }

        let watched = position - start;
        if watched < self.config.min_watched_fraction * duration {
            debug!(
                "not saving progress: {:.1}s watched of {:.1}s",
                watched.max(0.0),
                duration
            );
            return false;
        }

        let percent = (position / duration * 100.0).floor().clamp(0.0, 100.0) as u8;
        let episode_id = self.episode().id.clone();
        let progress = self
            .services
            .store
            .update(self.content_id, &episode_id, percent, false);

        self.services.events.emit(PlaybackProgressUpdated::new(
            self.content_id,
            episode_id.clone(),
            progress.progress_percent,
            position,
        ));
        if progress.completed && !self.completion_emitted {
            self.completion_emitted = true;
            self.services
                .events
                .emit(EpisodeCompleted::new(self.content_id, episode_id));
        }
        true
    }
}

fn log_skip_transitions(transitions: &[SkipTransition]) {
    for transition in transitions {
        match transition {
            SkipTransition::Entered {
                kind,
                auto_skip_armed,
            } => debug!("skip prompt for {} (auto: {})", kind, auto_skip_armed),
            SkipTransition::Exited { kind } => debug!("left {}", kind),
        }
    }
}
