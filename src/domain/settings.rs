use serde::{Deserialize, Serialize};

/// User preferences persisted alongside the watch history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerSettings {
    /// Mirror episode switches to the external tracking service
    pub sync_history: bool,
    /// Skip openings/endings after the countdown without user input
    pub auto_skip: bool,
    /// Continue with the next episode when one ends
    pub autoplay_next: bool,
    /// 0.0..=1.0
    pub volume: f64,
    pub muted: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            sync_history: false,
            auto_skip: false,
            autoplay_next: true,
            volume: 1.0,
            muted: false,
        }
    }
}

impl PlayerSettings {
    pub fn clamped_volume(&self) -> f64 {
        if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}
