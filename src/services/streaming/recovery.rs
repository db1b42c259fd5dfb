// src/services/streaming/recovery.rs
//
// Engine error recovery ladder
//
// Network error -> ask the engine to resume loading (bounded per stall)
// Media error   -> engine-level recovery once, then reinitialize
// Anything else -> reinitialize
// Reinitialization is bounded; past the bound the session fails.

use super::engine::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Non-fatal; the engine handles it
    Ignore,
    ResumeLoading,
    RecoverMedia,
    Reinitialize { attempt: u32 },
    GiveUp { attempts: u32 },
}

#[derive(Debug)]
pub struct RecoveryTracker {
    max_reinit_attempts: u32,
    max_network_recoveries: u32,
    reinit_attempts: u32,
    network_recoveries: u32,
    media_recovery_attempted: bool,
}

impl RecoveryTracker {
    pub fn new(max_reinit_attempts: u32, max_network_recoveries: u32) -> Self {
        Self {
            max_reinit_attempts,
            max_network_recoveries,
            reinit_attempts: 0,
            network_recoveries: 0,
            media_recovery_attempted: false,
        }
    }

    pub fn on_error(&mut self, kind: ErrorKind, fatal: bool) -> RecoveryAction {
        if !fatal {
            return RecoveryAction::Ignore;
        }

        match kind {
            ErrorKind::Network => {
                self.network_recoveries += 1;
                if self.network_recoveries > self.max_network_recoveries {
                    self.reinitialize()
                } else {
                    RecoveryAction::ResumeLoading
                }
            }
            ErrorKind::Media if !self.media_recovery_attempted => {
                self.media_recovery_attempted = true;
                RecoveryAction::RecoverMedia
            }
            ErrorKind::Media | ErrorKind::Other => self.reinitialize(),
        }
    }

    /// Playback moved forward, so the current stall is over
    pub fn on_playback_advanced(&mut self) {
        self.network_recoveries = 0;
    }

    /// A fresh engine instance gets fresh in-place recovery budgets.
    /// The reinitialization count is kept.
    pub fn on_reinitialized(&mut self) {
        self.network_recoveries = 0;
        self.media_recovery_attempted = false;
    }

    /// Attempts used by the current incident
    pub fn reinit_attempts(&self) -> u32 {
        self.reinit_attempts
    }

    /// Start over with full budgets: a new source, or the last incident
    /// ended with playback running again
    pub fn reset(&mut self) {
        self.reinit_attempts = 0;
        self.on_reinitialized();
    }

    fn reinitialize(&mut self) -> RecoveryAction {
        if self.reinit_attempts >= self.max_reinit_attempts {
            return RecoveryAction::GiveUp {
                attempts: self.reinit_attempts,
            };
        }
        self.reinit_attempts += 1;
        RecoveryAction::Reinitialize {
            attempt: self.reinit_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_fatal_ignored() {
        let mut tracker = RecoveryTracker::new(3, 3);
        assert_eq!(
            tracker.on_error(ErrorKind::Network, false),
            RecoveryAction::Ignore
        );
    }

    #[test]
    fn test_network_errors_bounded_per_stall() {
        let mut tracker = RecoveryTracker::new(3, 3);
        for _ in 0..3 {
            assert_eq!(
                tracker.on_error(ErrorKind::Network, true),
                RecoveryAction::ResumeLoading
            );
        }
        assert_eq!(
            tracker.on_error(ErrorKind::Network, true),
            RecoveryAction::Reinitialize { attempt: 1 }
        );
    }

    #[test]
    fn test_progress_resets_network_budget() {
        let mut tracker = RecoveryTracker::new(3, 1);
        tracker.on_error(ErrorKind::Network, true);
        tracker.on_playback_advanced();
        assert_eq!(
            tracker.on_error(ErrorKind::Network, true),
            RecoveryAction::ResumeLoading
        );
    }

    #[test]
    fn test_media_error_escalates() {
        let mut tracker = RecoveryTracker::new(3, 3);
        assert_eq!(
            tracker.on_error(ErrorKind::Media, true),
            RecoveryAction::RecoverMedia
        );
        assert_eq!(
            tracker.on_error(ErrorKind::Media, true),
            RecoveryAction::Reinitialize { attempt: 1 }
        );
        tracker.on_reinitialized();
        assert_eq!(
            tracker.on_error(ErrorKind::Media, true),
            RecoveryAction::RecoverMedia
        );
    }

    #[test]
    fn test_reset_starts_a_new_incident() {
        let mut tracker = RecoveryTracker::new(1, 3);
        assert_eq!(
            tracker.on_error(ErrorKind::Other, true),
            RecoveryAction::Reinitialize { attempt: 1 }
        );
        tracker.reset();
        assert_eq!(tracker.reinit_attempts(), 0);
        assert_eq!(
            tracker.on_error(ErrorKind::Other, true),
            RecoveryAction::Reinitialize { attempt: 1 }
        );
    }

    #[test]
    fn test_reinit_bounded() {
        let mut tracker = RecoveryTracker::new(3, 3);
        for attempt in 1..=3 {
            assert_eq!(
                tracker.on_error(ErrorKind::Other, true),
                RecoveryAction::Reinitialize { attempt }
            );
            tracker.on_reinitialized();
        }
        assert_eq!(
            tracker.on_error(ErrorKind::Other, true),
            RecoveryAction::GiveUp { attempts: 3 }
        );
    }
}
