pub mod entity;
pub mod invariants;

pub use entity::{
    ContentHistory, ContentId, EpisodeProgress, WatchHistory, COMPLETION_THRESHOLD_PERCENT,
};
pub use invariants::validate_progress_percent;
