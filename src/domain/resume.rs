use serde::{Deserialize, Serialize};

use crate::domain::episode::Episode;

/// Where "continue watching" should pick up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumePoint {
    pub episode: Episode,
    pub start_time_seconds: u64,
    /// True when pointing at the episode after a completed run
    pub is_next_unwatched: bool,
}
