// src/services/segment_skip.rs
//
// Segment Skip Detector - opening/ending skip prompts
//
// States: Idle, InOpening, InEnding. Only one segment is active at a
// time; entering one while in the other exits the first.
//
// Timing updates are throttled to one evaluation per whole second of
// media time. Seeks call `reevaluate` which bypasses the throttle.

use log::debug;
use serde::Serialize;
use std::collections::HashSet;

use crate::domain::{SegmentKind, SegmentRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipState {
    Idle,
    InOpening,
    InEnding,
}

impl SkipState {
    fn active(self) -> Option<SegmentKind> {
        match self {
            SkipState::Idle => None,
            SkipState::InOpening => Some(SegmentKind::Opening),
            SkipState::InEnding => Some(SegmentKind::Ending),
        }
    }

    fn entering(kind: SegmentKind) -> Self {
        match kind {
            SegmentKind::Opening => SkipState::InOpening,
            SegmentKind::Ending => SkipState::InEnding,
        }
    }
}

/// Transitions reported to the caller so it can show or hide the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipTransition {
    Entered { kind: SegmentKind, auto_skip_armed: bool },
    Exited { kind: SegmentKind },
}

/// A skip the caller must apply by seeking to `target`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkipJump {
    pub kind: SegmentKind,
    pub target: f64,
    pub automatic: bool,
}

#[derive(Debug)]
pub struct SegmentSkipDetector {
    opening: Option<SegmentRange>,
    ending: Option<SegmentRange>,
    state: SkipState,
    skipped: HashSet<SegmentKind>,
    /// Prompt hidden by the user until playback leaves this range
    dismissed: Option<SegmentKind>,
    last_evaluated_second: Option<i64>,
    countdown_started_ms: Option<u64>,
    auto_skip: bool,
    countdown_ms: u64,
    skip_offset: f64,
}

impl SegmentSkipDetector {
    pub fn new(countdown_ms: u64, skip_offset: f64, auto_skip: bool) -> Self {
        Self {
            opening: None,
            ending: None,
            state: SkipState::Idle,
            skipped: HashSet::new(),
            dismissed: None,
            last_evaluated_second: None,
            countdown_started_ms: None,
            auto_skip,
            countdown_ms,
            skip_offset,
        }
    }

    /// Start over for a new episode. Forgets which segments were skipped.
    pub fn reset(&mut self, opening: Option<SegmentRange>, ending: Option<SegmentRange>) {
        self.opening = opening;
        self.ending = ending;
        self.state = SkipState::Idle;
        self.skipped.clear();
        self.dismissed = None;
        self.last_evaluated_second = None;
        self.countdown_started_ms = None;
    }

    pub fn state(&self) -> SkipState {
        self.state
    }

    pub fn active_segment(&self) -> Option<SegmentKind> {
        self.state.active()
    }

    pub fn is_skipped(&self, kind: SegmentKind) -> bool {
        self.skipped.contains(&kind)
    }

    pub fn is_armed(&self) -> bool {
        self.countdown_started_ms.is_some()
    }

    pub fn auto_skip(&self) -> bool {
        self.auto_skip
    }

    /// Turning auto-skip on while a prompt is showing arms it immediately
    pub fn set_auto_skip(&mut self, enabled: bool, now_ms: u64) {
        self.auto_skip = enabled;
        if !enabled {
            self.countdown_started_ms = None;
        } else if self.state != SkipState::Idle && self.countdown_started_ms.is_none() {
            self.countdown_started_ms = Some(now_ms);
        }
    }

    /// Countdown progress 0..=100, 0 when nothing is armed
    pub fn skip_progress_percent(&self, now_ms: u64) -> u8 {
        let Some(started) = self.countdown_started_ms else {
            return 0;
        };
        if self.countdown_ms == 0 {
            return 100;
        }
        let elapsed = now_ms.saturating_sub(started);
        ((elapsed.min(self.countdown_ms) * 100) / self.countdown_ms) as u8
    }

    /// Throttled evaluation for timing updates
    pub fn on_time_update(&mut self, time: f64, now_ms: u64) -> Vec<SkipTransition> {
        let second = time.floor() as i64;
        if self.last_evaluated_second == Some(second) {
            return Vec::new();
        }
        self.reevaluate(time, now_ms)
    }

    /// Unthrottled evaluation, used right after seeks
    pub fn reevaluate(&mut self, time: f64, now_ms: u64) -> Vec<SkipTransition> {
        self.last_evaluated_second = Some(time.floor() as i64);

        if let Some(kind) = self.dismissed {
            let still_inside = self.range(kind).map(|r| r.contains(time)).unwrap_or(false);
            if !still_inside {
                self.dismissed = None;
            }
        }

        let candidate = [SegmentKind::Opening, SegmentKind::Ending]
            .into_iter()
            .find(|kind| self.is_eligible(*kind, time));

        let mut transitions = Vec::new();
        let active = self.state.active();
        if active.is_some() && active == candidate {
            return transitions;
        }

        if let Some(kind) = active {
            self.exit();
            transitions.push(SkipTransition::Exited { kind });
        }

        if let Some(kind) = candidate {
            self.state = SkipState::entering(kind);
            self.countdown_started_ms = self.auto_skip.then_some(now_ms);
            debug!("entered {} at {:.1}s (auto skip armed: {})", kind, time, self.auto_skip);
            transitions.push(SkipTransition::Entered {
                kind,
                auto_skip_armed: self.auto_skip,
            });
        }

        transitions
    }

    /// Returns the automatic skip once the countdown has run out
    pub fn poll(&mut self, now_ms: u64) -> Option<SkipJump> {
        let started = self.countdown_started_ms?;
        if now_ms.saturating_sub(started) < self.countdown_ms {
            return None;
        }
        self.skip_active(true)
    }

    /// User skip of whatever segment is showing. No-op when nothing is
    /// active or the segment was already skipped.
    pub fn skip(&mut self) -> Option<SkipJump> {
        self.skip_active(false)
    }

    /// Skip a specific segment regardless of the prompt
    pub fn skip_segment(&mut self, kind: SegmentKind) -> Option<SkipJump> {
        if self.skipped.contains(&kind) {
            return None;
        }
        let range = self.range(kind)?;
        self.skipped.insert(kind);
        if self.state.active() == Some(kind) {
            self.exit();
        }
        Some(SkipJump {
            kind,
            target: range.stop + self.skip_offset,
            automatic: false,
        })
    }

    /// Hide the prompt and cancel the countdown without skipping
    pub fn dismiss(&mut self) {
        if let Some(kind) = self.state.active() {
            self.dismissed = Some(kind);
            self.exit();
        }
    }

    pub fn cancel_countdown(&mut self) {
        self.countdown_started_ms = None;
    }

    fn skip_active(&mut self, automatic: bool) -> Option<SkipJump> {
        let kind = self.state.active()?;
        let mut jump = self.skip_segment(kind)?;
        jump.automatic = automatic;
        Some(jump)
    }

    fn is_eligible(&self, kind: SegmentKind, time: f64) -> bool {
        !self.skipped.contains(&kind)
            && self.dismissed != Some(kind)
            && self.range(kind).map(|r| r.contains(time)).unwrap_or(false)
    }

    fn range(&self, kind: SegmentKind) -> Option<SegmentRange> {
        match kind {
            SegmentKind::Opening => self.opening,
            SegmentKind::Ending => self.ending,
        }
    }

    fn exit(&mut self) {
        self.state = SkipState::Idle;
        self.countdown_started_ms = None;
    }
}
