// src/services/playback_ui.rs
//
// Playback UI Controller
//
// Turns user input (keys, pointer, buttons) into session calls and keeps
// the transient overlay state: control auto-hide, volume popup, hover
// preview, episode panel and shortcut help.
//
// PRINCIPLES:
// - Keyboard shortcuts are live only between mount and close
// - All overlay timers run off the same tick as the session
// - A terminal playback error is reported once as an effect

use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;

use crate::config::PlayerConfig;
use crate::domain::{EpisodeId, Quality};
use crate::error::{AppError, AppResult, PlaybackError};
use crate::runtime::clock::Clock;
use crate::services::settings_service::SettingsService;
use crate::services::streaming::{
    EngineEvent, MediaElement, MediaEvent, PlaybackSnapshot, SessionState,
    StreamingSessionController,
};
use crate::services::timers::TimerQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Escape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerIntent {
    TogglePlay,
    Play,
    Pause,
    Seek(f64),
    /// Progress bar click, 0.0..=1.0 of the duration
    SeekToFraction(f64),
    SeekRelative(f64),
    SetVolume(f64),
    AdjustVolume(f64),
    ToggleMute,
    ToggleFullscreen,
    ChangeQuality(Quality),
    SwitchEpisode(EpisodeId),
    NextEpisode,
    SkipSegment,
    DismissSkip,
    SetAutoSkip(bool),
    ToggleEpisodePanel,
    ToggleShortcutHelp,
    /// Closes the topmost overlay, then fullscreen, then the player
    Escape,
    Close,
}

/// Things the host must do in response to a UI call
#[derive(Debug, Clone, PartialEq)]
pub enum UiEffect {
    EnterFullscreen,
    ExitFullscreen,
    Failed(PlaybackError),
    Closed,
}

/// Map a key press to an intent.
///
/// Space/K play-pause, M mute, F fullscreen, arrows seek and volume,
/// E episodes, N next, S skip, ? shortcuts, Esc close.
pub fn intent_for_key(key: Key, seek_step: f64, volume_step: f64) -> Option<PlayerIntent> {
    let intent = match key {
        Key::ArrowLeft => PlayerIntent::SeekRelative(-seek_step),
        Key::ArrowRight => PlayerIntent::SeekRelative(seek_step),
        Key::ArrowUp => PlayerIntent::AdjustVolume(volume_step),
        Key::ArrowDown => PlayerIntent::AdjustVolume(-volume_step),
        Key::Escape => PlayerIntent::Escape,
        Key::Char(c) => match c.to_ascii_lowercase() {
            ' ' | 'k' => PlayerIntent::TogglePlay,
            'm' => PlayerIntent::ToggleMute,
            'f' => PlayerIntent::ToggleFullscreen,
            'e' => PlayerIntent::ToggleEpisodePanel,
            'n' => PlayerIntent::NextEpisode,
            's' => PlayerIntent::SkipSegment,
            '?' => PlayerIntent::ToggleShortcutHelp,
            _ => return None,
        },
    };
    Some(intent)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverPreview {
    pub fraction: f64,
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSnapshot {
    pub playback: PlaybackSnapshot,
    pub controls_visible: bool,
    pub volume_popup_visible: bool,
    pub episode_panel_open: bool,
    pub shortcut_help_open: bool,
    pub fullscreen: bool,
    pub hover: Option<HoverPreview>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum UiTimer {
    ControlsHide,
    VolumePopupHide,
}

pub struct PlaybackUiController<M: MediaElement> {
    session: StreamingSessionController<M>,
    settings: Arc<SettingsService>,
    clock: Arc<dyn Clock>,
    config: PlayerConfig,
    timers: TimerQueue<UiTimer>,

    mounted: bool,
    closed: bool,
    error_reported: bool,
    controls_visible: bool,
    volume_popup_visible: bool,
    episode_panel_open: bool,
    shortcut_help_open: bool,
    fullscreen: bool,
    hover: Option<HoverPreview>,
}

impl<M: MediaElement> PlaybackUiController<M> {
    pub fn new(
        session: StreamingSessionController<M>,
        settings: Arc<SettingsService>,
        clock: Arc<dyn Clock>,
        config: PlayerConfig,
    ) -> Self {
        Self {
            session,
            settings,
            clock,
            config,
            timers: TimerQueue::new(),
            mounted: false,
            closed: false,
            error_reported: false,
            controls_visible: true,
            volume_popup_visible: false,
            episode_panel_open: false,
            shortcut_help_open: false,
            fullscreen: false,
            hover: None,
        }
    }

    /// Bind input and start the session
    pub fn mount(&mut self) -> AppResult<Vec<UiEffect>> {
        if self.mounted || self.closed {
            return Ok(Vec::new());
        }
        self.mounted = true;
        self.show_controls();

        match self.session.open() {
            Ok(()) | Err(AppError::Playback(_)) => {}
            Err(e) => return Err(e),
        }
        Ok(self.failure_effect().into_iter().collect())
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn session(&self) -> &StreamingSessionController<M> {
        &self.session
    }

    pub fn handle_key(&mut self, key: Key) -> AppResult<Vec<UiEffect>> {
        if !self.mounted {
            return Ok(Vec::new());
        }
        match intent_for_key(key, self.config.seek_step_seconds, self.config.volume_step) {
            Some(intent) => self.dispatch(intent),
            None => Ok(Vec::new()),
        }
    }

    pub fn dispatch(&mut self, intent: PlayerIntent) -> AppResult<Vec<UiEffect>> {
        if !self.mounted {
            return Ok(Vec::new());
        }
        debug!("intent {:?}", intent);

        let mut effects = Vec::new();
        match intent {
            PlayerIntent::TogglePlay => self.session.toggle_play(),
            PlayerIntent::Play => self.session.play(),
            PlayerIntent::Pause => self.session.pause(),
            PlayerIntent::Seek(target) => {
                self.session.seek(target);
            }
            PlayerIntent::SeekToFraction(fraction) => {
                let target = fraction.clamp(0.0, 1.0) * self.session.duration();
                self.session.seek(target);
            }
            PlayerIntent::SeekRelative(delta) => {
                self.session.seek_relative(delta);
            }
            PlayerIntent::SetVolume(volume) => self.change_volume(volume),
            PlayerIntent::AdjustVolume(delta) => {
                let volume = self.session.media().volume() + delta;
                self.change_volume(volume);
            }
            PlayerIntent::ToggleMute => {
                self.session.toggle_mute();
                self.show_volume_popup();
                self.persist_audio();
            }
            PlayerIntent::ToggleFullscreen => effects.push(self.set_fullscreen(!self.fullscreen)),
            PlayerIntent::ChangeQuality(quality) => {
                self.session.change_quality(quality)?;
            }
            PlayerIntent::SwitchEpisode(episode_id) => {
                self.session.switch_episode(&episode_id)?;
                self.episode_panel_open = false;
            }
            PlayerIntent::NextEpisode => {
                self.session.next_episode()?;
            }
            PlayerIntent::SkipSegment => {
                self.session.skip_segment();
            }
            PlayerIntent::DismissSkip => self.session.dismiss_skip(),
            PlayerIntent::SetAutoSkip(enabled) => {
                self.session.set_auto_skip(enabled);
                self.settings.update(|s| s.auto_skip = enabled);
            }
            PlayerIntent::ToggleEpisodePanel => self.episode_panel_open = !self.episode_panel_open,
            PlayerIntent::ToggleShortcutHelp => self.shortcut_help_open = !self.shortcut_help_open,
            PlayerIntent::Escape => {
                if self.shortcut_help_open {
                    self.shortcut_help_open = false;
                } else if self.episode_panel_open {
                    self.episode_panel_open = false;
                } else if self.fullscreen {
                    effects.push(self.set_fullscreen(false));
                } else {
                    effects.extend(self.close());
                }
            }
            PlayerIntent::Close => effects.extend(self.close()),
        }

        if self.mounted {
            self.show_controls();
        }
        effects.extend(self.failure_effect());
        Ok(effects)
    }

    /// Pointer over the progress bar at `fraction` of its width
    pub fn hover(&mut self, fraction: f64) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.hover = Some(HoverPreview {
            fraction,
            time: fraction * self.session.duration(),
        });
        self.show_controls();
    }

    pub fn hover_end(&mut self) {
        self.hover = None;
        self.show_controls();
    }

    pub fn pointer_activity(&mut self) {
        if self.mounted {
            self.show_controls();
        }
    }

    pub fn handle_media_event(&mut self, event: MediaEvent) -> Vec<UiEffect> {
        let paused = event == MediaEvent::Pause;
        self.session.handle_media_event(event);
        if paused && self.mounted {
            self.show_controls();
        }
        self.failure_effect().into_iter().collect()
    }

    pub fn handle_engine_event(&mut self, generation: u64, event: EngineEvent) -> Vec<UiEffect> {
        self.session.handle_engine_event(generation, event);
        self.failure_effect().into_iter().collect()
    }

    pub fn tick(&mut self) -> Vec<UiEffect> {
        self.session.tick();

        let now = self.clock.monotonic_ms();
        for timer in self.timers.drain_due(now) {
            match timer {
                UiTimer::ControlsHide => {
                    if self.can_hide_controls() {
                        self.controls_visible = false;
                    }
                }
                UiTimer::VolumePopupHide => self.volume_popup_visible = false,
            }
        }

        self.failure_effect().into_iter().collect()
    }

    /// Tear everything down. The host removes the player on `Closed`.
    pub fn close(&mut self) -> Vec<UiEffect> {
        if self.closed {
            return Vec::new();
        }
        let mut effects = Vec::new();
        if self.fullscreen {
            effects.push(self.set_fullscreen(false));
        }

        self.session.close();
        self.timers.clear();
        self.mounted = false;
        self.closed = true;
        self.hover = None;
        info!("player closed");

        effects.push(UiEffect::Closed);
        effects
    }

    pub fn snapshot(&self) -> UiSnapshot {
        UiSnapshot {
            playback: self.session.snapshot(),
            controls_visible: self.controls_visible,
            volume_popup_visible: self.volume_popup_visible,
            episode_panel_open: self.episode_panel_open,
            shortcut_help_open: self.shortcut_help_open,
            fullscreen: self.fullscreen,
            hover: self.hover,
        }
    }

    fn change_volume(&mut self, volume: f64) {
        self.session.set_volume(volume);
        self.show_volume_popup();
        self.persist_audio();
    }

    fn persist_audio(&self) {
        let volume = self.session.settings().volume;
        let muted = self.session.settings().muted;
        self.settings.update(|s| {
            s.volume = volume;
            s.muted = muted;
        });
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> UiEffect {
        self.fullscreen = fullscreen;
        if fullscreen {
            UiEffect::EnterFullscreen
        } else {
            UiEffect::ExitFullscreen
        }
    }

    /// Controls stay up while paused, while hovering and while a panel is open
    fn can_hide_controls(&self) -> bool {
        self.session.state() == &SessionState::Playing
            && self.hover.is_none()
            && !self.episode_panel_open
            && !self.shortcut_help_open
    }

    fn show_controls(&mut self) {
        self.controls_visible = true;
        let now = self.clock.monotonic_ms();
        self.timers
            .schedule(UiTimer::ControlsHide, now, self.config.controls_hide_ms);
    }

    fn show_volume_popup(&mut self) {
        self.volume_popup_visible = true;
        let now = self.clock.monotonic_ms();
        self.timers
            .schedule(UiTimer::VolumePopupHide, now, self.config.volume_popup_ms);
    }

    fn failure_effect(&mut self) -> Option<UiEffect> {
        if self.error_reported {
            return None;
        }
        match self.session.state() {
            SessionState::Error { error } => {
                self.error_reported = true;
                Some(UiEffect::Failed(error.clone()))
            }
            _ => None,
        }
    }
}
