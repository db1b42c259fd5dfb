// src/services/streaming/state.rs
//
// Session lifecycle
//
// Uninitialized -> Attaching -> Loading -> Ready -> Playing <-> Paused
//
// Quality and episode changes go back through Attaching. Any live state
// can fail into Error, which only allows Destroyed. Destroyed is final.

use serde::Serialize;

use crate::error::PlaybackError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Attaching,
    Loading,
    Ready,
    Playing,
    Paused,
    Error { error: PlaybackError },
    Destroyed,
}

impl SessionState {
    pub fn can_transition_to(&self, next: &SessionState) -> bool {
        use SessionState::*;

        if matches!(next, Destroyed) {
            return !matches!(self, Destroyed);
        }
        if matches!(next, Error { .. }) {
            return !self.is_terminal();
        }

        matches!(
            (self, next),
            (Uninitialized, Attaching)
                | (Attaching, Loading)
                | (Loading, Ready)
                | (Loading, Attaching)
                | (Ready, Playing)
                | (Ready, Paused)
                | (Ready, Attaching)
                | (Playing, Paused)
                | (Paused, Playing)
                | (Playing, Attaching)
                | (Paused, Attaching)
        )
    }

    /// Error and Destroyed accept nothing but teardown
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Error { .. } | SessionState::Destroyed)
    }

    /// A source is loaded and the element can be driven
    pub fn is_ready(&self) -> bool {
        matches!(
            self,
            SessionState::Ready | SessionState::Playing | SessionState::Paused
        )
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Attaching | SessionState::Loading)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Attaching => "attaching",
            SessionState::Loading => "loading",
            SessionState::Ready => "ready",
            SessionState::Playing => "playing",
            SessionState::Paused => "paused",
            SessionState::Error { .. } => "error",
            SessionState::Destroyed => "destroyed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            SessionState::Uninitialized,
            SessionState::Attaching,
            SessionState::Loading,
            SessionState::Ready,
            SessionState::Playing,
            SessionState::Paused,
            SessionState::Playing,
            SessionState::Attaching,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(&pair[1]), "{:?}", pair);
        }
    }

    #[test]
    fn test_error_is_dead_end() {
        let error = SessionState::Error {
            error: PlaybackError::Unsupported,
        };
        assert!(error.can_transition_to(&SessionState::Destroyed));
        assert!(!error.can_transition_to(&SessionState::Attaching));
        assert!(!error.can_transition_to(&SessionState::Playing));
    }

    #[test]
    fn test_destroyed_is_final() {
        let destroyed = SessionState::Destroyed;
        assert!(!destroyed.can_transition_to(&SessionState::Destroyed));
        assert!(!destroyed.can_transition_to(&SessionState::Attaching));
        assert!(!destroyed.can_transition_to(&SessionState::Error {
            error: PlaybackError::Unsupported
        }));
    }

    #[test]
    fn test_cannot_skip_loading() {
        assert!(!SessionState::Uninitialized.can_transition_to(&SessionState::Playing));
        assert!(!SessionState::Attaching.can_transition_to(&SessionState::Ready));
    }
}
